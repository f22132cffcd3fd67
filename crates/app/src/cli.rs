use std::path::PathBuf;

use anyhow::Context;
use buddy_core::model::{Language, Level};
use clap::{Args, Parser, Subcommand};
use services::ai::AiConfig;
use services::ai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(name = "codebuddy")]
#[command(about = "Practice coding with timed quizzes, a runner game and an AI code reviewer")]
#[command(version)]
pub struct Cli {
    /// SQLite database (path or sqlite:// URL)
    #[arg(long, global = true, env = "BUDDY_DB_URL", default_value = "sqlite://codebuddy.sqlite3")]
    pub db: String,

    /// Log progress at info level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Chat-completions gateway base URL
    #[arg(long, global = true, env = "BUDDY_AI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub ai_base_url: String,

    /// Model name sent to the gateway
    #[arg(long, global = true, env = "BUDDY_AI_MODEL", default_value = DEFAULT_MODEL)]
    pub ai_model: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// AI settings, or `None` when `BUDDY_AI_API_KEY` is unset or blank.
    pub fn ai_config(&self) -> anyhow::Result<Option<AiConfig>> {
        let Some(api_key) = std::env::var("BUDDY_AI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
        else {
            return Ok(None);
        };
        let config = AiConfig::new(&self.ai_base_url, api_key, self.ai_model.clone())
            .with_context(|| format!("invalid AI base URL: {}", self.ai_base_url))?;
        Ok(Some(config))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Timed multiple-choice quiz
    Quiz(QuizArgs),

    /// Runner game: dodge into obstacles and answer to keep running
    Run(RunArgs),

    /// Review a source file with the AI assistant
    Analyze(CodeArgs),

    /// Ask the AI assistant what to write next
    Suggest(SuggestArgs),

    /// Guess the language of a source file
    Detect {
        /// File to inspect ("-" for stdin)
        file: PathBuf,
    },

    /// Print the starter template for a language
    Template {
        #[arg(value_parser = parse_language)]
        language: Language,
    },

    /// Saved code snippets
    #[command(subcommand)]
    Library(LibraryCommand),

    /// Local player profile
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
pub struct QuizArgs {
    #[arg(short, long, default_value = "javascript", value_parser = parse_quiz_language)]
    pub language: Language,

    /// Starting level (1-5)
    #[arg(long, default_value = "1", value_parser = parse_level)]
    pub level: Level,

    /// Generate questions with the AI gateway instead of the built-in bank
    #[arg(long)]
    pub ai: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(short, long, default_value = "javascript", value_parser = parse_quiz_language)]
    pub language: Language,

    /// Generate questions with the AI gateway instead of the built-in bank
    #[arg(long)]
    pub ai: bool,

    /// Milliseconds per animation frame
    #[arg(long, default_value_t = 50)]
    pub frame_ms: u64,
}

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Source file ("-" for stdin)
    pub file: PathBuf,

    /// Override the detected language
    #[arg(short, long, value_parser = parse_language)]
    pub language: Option<Language>,

    /// Write the corrected code back to the file
    #[arg(long)]
    pub apply: bool,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Source file ("-" for stdin)
    pub file: PathBuf,

    /// Override the detected language
    #[arg(short, long, value_parser = parse_language)]
    pub language: Option<Language>,

    /// Append suggestion number N (1-based) to the file
    #[arg(long)]
    pub append: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommand {
    /// Save a file to the library
    Save {
        file: PathBuf,
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
    },
    /// List saved projects, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Search code and language names
    Search { term: String },
    /// Print a saved project's code
    Open { id: u64 },
    /// Delete a saved project
    Delete { id: u64 },
    /// Project, language and line counts
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    SetName { name: String },
    SetAvatar { url: String },
    ClearAvatar,
}

fn parse_language(raw: &str) -> Result<Language, String> {
    raw.parse::<Language>().map_err(|e| e.to_string())
}

fn parse_quiz_language(raw: &str) -> Result<Language, String> {
    let language = parse_language(raw)?;
    if language.is_quizzable() {
        Ok(language)
    } else {
        Err(format!("{language} has no quiz questions"))
    }
}

fn parse_level(raw: &str) -> Result<Level, String> {
    let value: u8 = raw.parse().map_err(|_| format!("invalid level: {raw}"))?;
    Level::new(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quiz_flags() {
        let cli = Cli::try_parse_from(["codebuddy", "quiz", "-l", "py", "--level", "3"]).unwrap();
        match cli.command {
            Command::Quiz(args) => {
                assert_eq!(args.language, Language::Python);
                assert_eq!(args.level.value(), 3);
                assert!(!args.ai);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(Cli::try_parse_from(["codebuddy", "quiz", "--level", "9"]).is_err());
        assert!(Cli::try_parse_from(["codebuddy", "template", "cobol"]).is_err());
    }

    #[test]
    fn html_is_not_a_quiz_language() {
        assert!(Cli::try_parse_from(["codebuddy", "quiz", "-l", "html"]).is_err());
        assert!(Cli::try_parse_from(["codebuddy", "run", "--language", "html"]).is_err());
        assert!(Cli::try_parse_from(["codebuddy", "template", "html"]).is_ok());
        assert!(Cli::try_parse_from(["codebuddy", "run", "-l", "rust", "--ai"]).is_ok());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["codebuddy", "library", "list", "--db", "sqlite::memory:", "-v"])
            .unwrap();
        assert_eq!(cli.db, "sqlite::memory:");
        assert!(cli.verbose);
    }
}
