use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// Programming languages the editor and quizzes know about.
///
/// Serialized with the display names the product shows ("C++", "C#", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    JavaScript,
    Java,
    #[serde(rename = "C++")]
    Cpp,
    #[serde(rename = "C#")]
    CSharp,
    TypeScript,
    Python,
    #[serde(rename = "PHP")]
    Php,
    #[serde(rename = "HTML")]
    Html,
    Rust,
    Go,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl Language {
    /// Every language selectable in the editor.
    pub const ALL: [Language; 10] = [
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::TypeScript,
        Language::Python,
        Language::Php,
        Language::Html,
        Language::Rust,
        Language::Go,
    ];

    /// Languages offered for quizzes (markup is not quizzable).
    pub const QUIZ: [Language; 9] = [
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::TypeScript,
        Language::Python,
        Language::Php,
        Language::Rust,
        Language::Go,
    ];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Php => "PHP",
            Language::Html => "HTML",
            Language::Rust => "Rust",
            Language::Go => "Go",
        }
    }

    #[must_use]
    pub fn is_quizzable(self) -> bool {
        !matches!(self, Language::Html)
    }

    /// Starter snippet loaded into the editor when switching language.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Language::JavaScript => {
                "// JavaScript Template\nfunction greetUser(name) {\n  console.log(`Hello, ${name}!`);\n}\n\ngreetUser(\"World\");"
            }
            Language::Python => {
                "# Python Template\ndef greet_user(name):\n    print(f\"Hello, {name}!\")\n\ngreet_user(\"World\")"
            }
            Language::Java => {
                "// Java Template\npublic class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}"
            }
            Language::Cpp => {
                "// C++ Template\n#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}"
            }
            Language::CSharp => {
                "// C# Template\nusing System;\n\nclass Program {\n    static void Main() {\n        Console.WriteLine(\"Hello, World!\");\n    }\n}"
            }
            Language::TypeScript => {
                "// TypeScript Template\nfunction greetUser(name: string): void {\n  console.log(`Hello, ${name}!`);\n}\n\ngreetUser(\"World\");"
            }
            Language::Php => {
                "<?php\n// PHP Template\nfunction greetUser($name) {\n    echo \"Hello, $name!\";\n}\n\ngreetUser(\"World\");\n?>"
            }
            Language::Html => {
                "<!DOCTYPE html>\n<html>\n<head>\n  <title>Hello</title>\n</head>\n<body>\n  <h1>Hello, World!</h1>\n</body>\n</html>"
            }
            Language::Rust => {
                "// Rust Template\nfn main() {\n    let name = \"World\";\n    println!(\"Hello, {}!\", name);\n}"
            }
            Language::Go => {
                "// Go Template\npackage main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello, World!\")\n}"
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let language = match normalized.as_str() {
            "javascript" | "js" => Language::JavaScript,
            "java" => Language::Java,
            "c++" | "cpp" => Language::Cpp,
            "c#" | "csharp" | "cs" => Language::CSharp,
            "typescript" | "ts" => Language::TypeScript,
            "python" | "py" => Language::Python,
            "php" => Language::Php,
            "html" => Language::Html,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            _ => return Err(UnknownLanguage(s.to_string())),
        };
        Ok(language)
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Quiz difficulty, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level must be between 1 and 5, got {0}")]
    OutOfRange(u8),
}

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(5);

    /// Create a validated level.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::OutOfRange` outside 1..=5.
    pub fn new(value: u8) -> Result<Self, LevelError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LevelError::OutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The level unlocked after passing this one; stays at the top level.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    /// Concepts covered at this level.
    #[must_use]
    pub fn topic(self) -> &'static str {
        match self.0 {
            1 => "Variables, basic syntax, data types",
            2 => "Conditionals, comparison operators, boolean logic",
            3 => "Loops, iteration, loop control",
            4 => "Functions, scope, parameters",
            _ => "Arrays/Lists, data structures, methods",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
