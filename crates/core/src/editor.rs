use crate::model::Language;

/// Guess the language of a snippet from telltale keywords.
///
/// Checks run in a fixed order, so mixed snippets resolve to the first match.
#[must_use]
pub fn detect_language(code: &str) -> Language {
    let has = |needle: &str| code.contains(needle);

    if has("<?php") || has("$_") {
        Language::Php
    } else if has("fn main") || has("let mut") {
        Language::Rust
    } else if has("func ") || has("package main") {
        Language::Go
    } else if has("public static void main") || has("System.out") {
        Language::Java
    } else if has("def ") || has("print(") {
        Language::Python
    } else if has("interface ") || has(": ") {
        Language::TypeScript
    } else if has("#include") || has("std::") {
        Language::Cpp
    } else if has("using System") || has("Console.WriteLine") {
        Language::CSharp
    } else {
        Language::JavaScript
    }
}

/// The code currently open in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorBuffer {
    code: String,
    language: Language,
}

impl EditorBuffer {
    #[must_use]
    pub fn new(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }

    /// A buffer holding the starter template for `language`.
    #[must_use]
    pub fn from_template(language: Language) -> Self {
        Self::new(language.template(), language)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Switch language and replace the code with that language's template.
    pub fn load_template(&mut self, language: Language) {
        self.language = language;
        self.code = language.template().to_string();
    }

    /// Append a suggested snippet on a new line.
    pub fn append_suggestion(&mut self, suggestion: &str) {
        self.code.push('\n');
        self.code.push_str(suggestion);
    }

    /// Replace the code with an AI correction. Empty corrections are ignored.
    pub fn apply_correction(&mut self, corrected: &str) -> bool {
        if corrected.trim().is_empty() {
            return false;
        }
        self.code = corrected.to_string();
        true
    }
}
