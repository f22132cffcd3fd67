//! AI gateway access: quiz generation, code analysis and code suggestions.

pub mod analysis;
pub mod client;
pub mod json;
pub mod questions;
pub mod suggestions;

pub use analysis::{AnalysisIssue, CodeAnalysis, CodeAnalyzer, CodeRequest, Severity};
pub use client::{AiClient, AiConfig};
pub use questions::{
    AiQuestionSource, GenerateQuestionsRequest, GenerateQuestionsResponse, QuestionSource,
    StaticQuestionSource, WireQuestion,
};
pub use suggestions::{CodeSuggester, CodeSuggestions};
