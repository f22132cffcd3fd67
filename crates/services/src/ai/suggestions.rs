use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::analysis::CodeRequest;
use super::client::AiClient;
use super::json::strip_code_fences;
use crate::error::AiError;

const SUGGESTION_TEMPERATURE: f32 = 0.7;
const FALLBACK_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSuggestions {
    pub suggestions: Vec<String>,
}

/// Proposes next snippets for the code in the editor.
#[derive(Clone)]
pub struct CodeSuggester {
    client: Arc<AiClient>,
}

impl CodeSuggester {
    #[must_use]
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }

    /// Ask for 3-5 ready-to-insert snippets.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Validation` for blank input and gateway errors
    /// otherwise.
    pub async fn suggest(&self, request: &CodeRequest) -> Result<CodeSuggestions, AiError> {
        request.validate()?;
        info!(language = %request.language, "requesting code suggestions");

        let system = format!(
            "You are a {} coding assistant. Analyze the current code and provide 3-5 specific, actionable code suggestions for the next logical steps or improvements.\n\nReturn ONLY a JSON array of suggestion strings, no additional text or formatting:\n[\"suggestion 1\", \"suggestion 2\", \"suggestion 3\"]\n\nEach suggestion should be a complete, ready-to-use code snippet that the user can directly add to their code.",
            request.language
        );
        let user = format!(
            "Current {} code:\n\n{}\n\nProvide specific code suggestions for what to add or improve next:",
            request.language, request.code
        );
        let content = self
            .client
            .chat(&system, &user, SUGGESTION_TEMPERATURE)
            .await?;

        Ok(CodeSuggestions {
            suggestions: parse_suggestions(&content),
        })
    }
}

pub(crate) fn parse_suggestions(content: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(&strip_code_fences(content)) {
        Ok(suggestions) => suggestions,
        Err(err) => {
            warn!(error = %err, "suggestions reply was not a JSON array; splitting lines");
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .take(FALLBACK_LIMIT)
                .map(str::to_string)
                .collect()
        }
    }
}
