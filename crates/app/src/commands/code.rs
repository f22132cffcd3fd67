use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use buddy_core::editor::{EditorBuffer, detect_language};
use buddy_core::model::Language;
use services::AppServices;
use services::ai::{CodeRequest, Severity};

use crate::cli::{CodeArgs, SuggestArgs};

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a source file, or stdin for "-".
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    if is_stdin(path) {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("reading stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_buffer(path: &Path, language: Option<Language>) -> anyhow::Result<EditorBuffer> {
    let code = read_source(path)?;
    let language = language.unwrap_or_else(|| detect_language(&code));
    Ok(EditorBuffer::new(code, language))
}

fn write_back(path: &Path, buffer: &EditorBuffer) -> anyhow::Result<()> {
    if is_stdin(path) {
        println!("{}", buffer.code());
        return Ok(());
    }
    std::fs::write(path, buffer.code()).with_context(|| format!("writing {}", path.display()))
}

pub async fn analyze(services: &AppServices, args: CodeArgs) -> anyhow::Result<()> {
    let mut buffer = load_buffer(&args.file, args.language)?;
    let analysis = services
        .analyzer()
        .analyze(&CodeRequest::new(buffer.code(), buffer.language()))
        .await?;

    println!(
        "{} ({}, confidence {:.0}%)",
        analysis.one_line_summary,
        analysis.language,
        analysis.confidence * 100.0
    );
    for issue in &analysis.errors {
        let label = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        match issue.line {
            Some(line) => println!("  {label} (line {line}): {}", issue.message),
            None => println!("  {label}: {}", issue.message),
        }
        if let Some(snippet) = &issue.snippet {
            println!("      {snippet}");
        }
    }
    if !analysis.explanation.is_empty() {
        println!("\n{}", analysis.explanation);
    }
    for suggestion in &analysis.suggestions {
        println!("  - {suggestion}");
    }

    if args.apply {
        if buffer.apply_correction(&analysis.corrected_code) {
            write_back(&args.file, &buffer)?;
            println!("Applied corrected code.");
        } else {
            println!("No corrected code to apply.");
        }
    }
    Ok(())
}

pub async fn suggest(services: &AppServices, args: SuggestArgs) -> anyhow::Result<()> {
    let mut buffer = load_buffer(&args.file, args.language)?;
    let suggestions = services
        .suggester()
        .suggest(&CodeRequest::new(buffer.code(), buffer.language()))
        .await?
        .suggestions;

    if suggestions.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("{}. {suggestion}", i + 1);
    }

    if let Some(n) = args.append {
        let Some(chosen) = n.checked_sub(1).and_then(|i| suggestions.get(i)) else {
            bail!("no suggestion number {n}");
        };
        buffer.append_suggestion(chosen);
        write_back(&args.file, &buffer)?;
    }
    Ok(())
}

pub fn detect(path: &Path) -> anyhow::Result<()> {
    let code = read_source(path)?;
    println!("{}", detect_language(&code));
    Ok(())
}

pub fn template(language: Language) {
    println!("{}", EditorBuffer::from_template(language).code());
}
