use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use buddy_core::model::Language;

use super::client::AiClient;
use super::json::strip_code_fences;
use crate::error::AiError;

const ANALYSIS_TEMPERATURE: f32 = 0.7;
const PARSED_CONFIDENCE: f32 = 0.95;
const FALLBACK_CONFIDENCE: f32 = 0.8;
const DEFAULT_SUMMARY: &str = "Code analysis complete";

/// `{ code, language }`, the input of both code analysis and suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRequest {
    pub code: String,
    pub language: String,
}

impl CodeRequest {
    #[must_use]
    pub fn new(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language: language.display_name().to_string(),
        }
    }

    /// Reject requests with blank code or language.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Validation`.
    pub fn validate(&self) -> Result<(), AiError> {
        if self.code.trim().is_empty() || self.language.trim().is_empty() {
            return Err(AiError::Validation("Code and language are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    #[default]
    #[serde(other)]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub language: String,
    pub confidence: f32,
    pub errors: Vec<AnalysisIssue>,
    pub corrected_code: String,
    pub explanation: String,
    pub one_line_summary: String,
    pub suggestions: Vec<String>,
}

impl CodeAnalysis {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Error)
    }

    /// Reply used when the model did not return parseable JSON.
    fn fallback(request: &CodeRequest, raw: &str) -> Self {
        Self {
            language: request.language.clone(),
            confidence: FALLBACK_CONFIDENCE,
            errors: Vec::new(),
            corrected_code: request.code.clone(),
            explanation: raw.to_string(),
            one_line_summary: DEFAULT_SUMMARY.to_string(),
            suggestions: Vec::new(),
        }
    }
}

/// Whatever subset of the analysis the model actually returned.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialAnalysis {
    language: Option<String>,
    confidence: Option<f32>,
    errors: Option<Vec<Value>>,
    corrected_code: Option<String>,
    explanation: Option<String>,
    one_line_summary: Option<String>,
    suggestions: Option<Vec<String>>,
}

impl PartialAnalysis {
    fn merge_over_defaults(self, request: &CodeRequest, raw: &str) -> CodeAnalysis {
        let errors = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AnalysisIssue>(value) {
                Ok(issue) => Some(issue),
                Err(err) => {
                    warn!(error = %err, "dropping malformed analysis issue");
                    None
                }
            })
            .collect();

        CodeAnalysis {
            language: self.language.unwrap_or_else(|| request.language.clone()),
            confidence: self.confidence.unwrap_or(PARSED_CONFIDENCE).clamp(0.0, 1.0),
            errors,
            corrected_code: self
                .corrected_code
                .unwrap_or_else(|| request.code.clone()),
            explanation: self.explanation.unwrap_or_else(|| raw.to_string()),
            one_line_summary: self
                .one_line_summary
                .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            suggestions: self.suggestions.unwrap_or_default(),
        }
    }
}

/// Reviews code through the AI gateway.
#[derive(Clone)]
pub struct CodeAnalyzer {
    client: Arc<AiClient>,
}

impl CodeAnalyzer {
    #[must_use]
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }

    /// Analyze a snippet for errors and improvements.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Validation` for blank input and gateway errors
    /// otherwise. Unparseable replies are not errors; they yield a fallback
    /// analysis carrying the raw reply as the explanation.
    pub async fn analyze(&self, request: &CodeRequest) -> Result<CodeAnalysis, AiError> {
        request.validate()?;
        info!(language = %request.language, bytes = request.code.len(), "analyzing code");

        let content = self
            .client
            .chat(
                &analysis_prompt(&request.language),
                &format!("Analyze this {} code:\n\n{}", request.language, request.code),
                ANALYSIS_TEMPERATURE,
            )
            .await?;

        Ok(parse_analysis(request, &content))
    }
}

pub(crate) fn parse_analysis(request: &CodeRequest, content: &str) -> CodeAnalysis {
    match serde_json::from_str::<PartialAnalysis>(&strip_code_fences(content)) {
        Ok(partial) => partial.merge_over_defaults(request, content),
        Err(err) => {
            warn!(error = %err, "analysis reply was not JSON; using fallback");
            CodeAnalysis::fallback(request, content)
        }
    }
}

fn analysis_prompt(language: &str) -> String {
    format!(
        r#"You are an expert {language} programming assistant. Analyze the provided code and return a JSON object with this EXACT structure:

{{
  "language": "{language}",
  "confidence": 0.95,
  "errors": [
    {{
      "line": 5,
      "severity": "error",
      "message": "Clear error description",
      "snippet": "code snippet with error"
    }}
  ],
  "corrected_code": "Full corrected version of the code",
  "explanation": "Detailed explanation of fixes and improvements",
  "one_line_summary": "Brief summary",
  "suggestions": ["Suggestion 1", "Suggestion 2", "Suggestion 3"]
}}

Focus on:
- Syntax errors
- Logic errors
- Best practices for {language}
- Performance improvements
- Code readability

Return ONLY valid JSON, no markdown formatting, no code blocks."#
    )
}
