use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use buddy_core::model::{Language, Level, Question, QuestionError};
use buddy_core::quiz::{FetchTicket, QuestionBank};

use super::client::AiClient;
use super::json::strip_code_fences;
use crate::error::AiError;

const GENERATION_TEMPERATURE: f32 = 0.8;

/// Produces question batches for a `FetchTicket`.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch up to `ticket.count` questions not in `ticket.exclude`.
    ///
    /// # Errors
    ///
    /// Returns `AiError` when the backing source fails.
    async fn next_batch(&self, ticket: &FetchTicket) -> Result<Vec<Question>, AiError>;

    /// Whether this source can produce questions for `language` at all.
    fn supports(&self, language: Language) -> bool {
        language.is_quizzable()
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub language: Language,
    pub level: Level,
    pub count: usize,
    #[serde(default)]
    pub exclude_questions: Vec<String>,
}

impl GenerateQuestionsRequest {
    #[must_use]
    pub fn from_ticket(ticket: &FetchTicket) -> Self {
        Self {
            language: ticket.language,
            level: ticket.level,
            count: ticket.count,
            exclude_questions: ticket.exclude.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<WireQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl WireQuestion {
    /// Validate into a domain question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for blank prompts, wrong option counts or an
    /// out-of-range answer index.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        Question::new(
            self.question,
            self.options,
            self.correct_answer,
            self.concept,
            self.explanation,
        )
    }
}

impl From<&Question> for WireQuestion {
    fn from(question: &Question) -> Self {
        Self {
            question: question.prompt().to_string(),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer(),
            concept: question.concept().to_string(),
            explanation: question.explanation().map(str::to_string),
        }
    }
}

//
// ─── AI SOURCE ─────────────────────────────────────────────────────────────────
//

/// Generates fresh questions through the AI gateway.
///
/// The exclusion list is passed to the model; results are not re-checked
/// against it.
#[derive(Clone)]
pub struct AiQuestionSource {
    client: Arc<AiClient>,
}

impl AiQuestionSource {
    #[must_use]
    pub fn new(client: Arc<AiClient>) -> Self {
        Self { client }
    }

    /// Generate questions for a wire request.
    ///
    /// # Errors
    ///
    /// Returns `AiError` for gateway failures, or `AiError::MalformedResponse`
    /// when no entry in the reply is a usable question.
    pub async fn generate(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<GenerateQuestionsResponse, AiError> {
        info!(
            language = %request.language,
            level = %request.level,
            count = request.count,
            excluded = request.exclude_questions.len(),
            "generating quiz questions"
        );
        let content = self
            .client
            .chat(
                &system_prompt(request),
                &format!(
                    "Generate {} {} questions for level {}",
                    request.count, request.language, request.level
                ),
                GENERATION_TEMPERATURE,
            )
            .await?;

        let questions = parse_questions(&content)?;
        Ok(GenerateQuestionsResponse {
            questions: questions.iter().map(WireQuestion::from).collect(),
        })
    }
}

#[async_trait]
impl QuestionSource for AiQuestionSource {
    async fn next_batch(&self, ticket: &FetchTicket) -> Result<Vec<Question>, AiError> {
        let response = self
            .generate(&GenerateQuestionsRequest::from_ticket(ticket))
            .await?;
        response
            .questions
            .into_iter()
            .map(WireQuestion::into_question)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| AiError::MalformedResponse(err.to_string()))
    }
}

fn system_prompt(request: &GenerateQuestionsRequest) -> String {
    let GenerateQuestionsRequest {
        language,
        level,
        count,
        exclude_questions,
    } = request;

    let mut prompt = format!(
        "You are an expert programming quiz generator. Generate {count} unique, non-repeating quiz questions for {language} programming language at difficulty level {level} (1-5).\n\nEach question should test understanding of {language} concepts appropriate for level {level}:\n"
    );
    for value in Level::MIN.value()..=Level::MAX.value() {
        if let Ok(l) = Level::new(value) {
            let _ = writeln!(prompt, "- Level {l}: {}", l.topic());
        }
    }

    if !exclude_questions.is_empty() {
        prompt.push_str("\n\nDO NOT generate these questions that were already asked:\n");
        for (i, asked) in exclude_questions.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {asked}", i + 1);
        }
    }

    prompt.push_str(
        r#"
Return ONLY a valid JSON array with this exact structure:
[
  {
    "question": "Clear question text",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correctAnswer": 0,
    "concept": "Brief concept name",
    "explanation": "Why this answer is correct"
  }
]

CRITICAL:
- Return ONLY the JSON array, no markdown formatting, no code blocks, no additional text.
- DO NOT repeat any questions from the excluded list above.
- Generate completely NEW questions with different wording and topics."#,
    );
    prompt
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionPayload {
    List(Vec<Value>),
    Wrapped { questions: Vec<Value> },
}

/// Parse a model reply into validated questions, dropping unusable entries.
pub(crate) fn parse_questions(content: &str) -> Result<Vec<Question>, AiError> {
    let cleaned = strip_code_fences(content);
    let payload: QuestionPayload = serde_json::from_str(&cleaned)
        .map_err(|err| AiError::MalformedResponse(err.to_string()))?;
    let entries = match payload {
        QuestionPayload::List(entries) | QuestionPayload::Wrapped { questions: entries } => {
            entries
        }
    };

    let total = entries.len();
    let questions: Vec<Question> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let parsed = serde_json::from_value::<WireQuestion>(entry)
                .map_err(|err| err.to_string())
                .and_then(|wire| wire.into_question().map_err(|err| err.to_string()));
            match parsed {
                Ok(question) => Some(question),
                Err(reason) => {
                    warn!(index, %reason, "dropping malformed generated question");
                    None
                }
            }
        })
        .collect();

    if questions.is_empty() {
        return Err(AiError::MalformedResponse(format!(
            "none of {total} generated questions were usable"
        )));
    }
    Ok(questions)
}

//
// ─── STATIC SOURCE ─────────────────────────────────────────────────────────────
//

/// Serves shuffled questions from the built-in bank.
#[derive(Debug, Clone, Copy)]
pub struct StaticQuestionSource {
    bank: QuestionBank,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(QuestionBank::builtin())
    }

    #[must_use]
    pub fn draw(&self, ticket: &FetchTicket) -> Vec<Question> {
        let mut candidates = self
            .bank
            .candidates(ticket.level, ticket.language, &ticket.exclude);
        candidates.shuffle(&mut rng());
        candidates.truncate(ticket.count);
        candidates
    }
}

impl Default for StaticQuestionSource {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn next_batch(&self, ticket: &FetchTicket) -> Result<Vec<Question>, AiError> {
        Ok(self.draw(ticket))
    }

    fn supports(&self, language: Language) -> bool {
        language.is_quizzable() && self.bank.languages().contains(&language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::quiz::QuizSession;

    fn ticket(exclude: Vec<String>) -> FetchTicket {
        let mut session = QuizSession::standalone(Language::Python, Level::MIN);
        let mut ticket = session.start().unwrap();
        ticket.exclude = exclude;
        ticket
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let request = GenerateQuestionsRequest::from_ticket(&ticket(vec!["Q1".into()]));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language"], "Python");
        assert_eq!(json["level"], 1);
        assert_eq!(json["count"], 5);
        assert_eq!(json["excludeQuestions"][0], "Q1");
    }

    #[test]
    fn prompt_lists_topics_and_numbered_exclusions() {
        let request = GenerateQuestionsRequest::from_ticket(&ticket(vec![
            "First?".into(),
            "Second?".into(),
        ]));
        let prompt = system_prompt(&request);
        assert!(prompt.contains("- Level 3: Loops, iteration, loop control"));
        assert!(prompt.contains("1. First?\n2. Second?"));

        let bare = GenerateQuestionsRequest::from_ticket(&ticket(Vec::new()));
        assert!(!system_prompt(&bare).contains("already asked"));
    }

    #[test]
    fn parses_fenced_replies_and_drops_bad_entries() {
        let content = r#"```json
[
  {"question": "What is 1+1?", "options": ["1","2","3","4"], "correctAnswer": 1, "concept": "Math"},
  {"question": "Broken", "options": ["a","b"], "correctAnswer": 0, "concept": "x"},
  {"nope": true}
]
```"#;
        let questions = parse_questions(content).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer(), 1);
    }

    #[test]
    fn accepts_wrapped_payloads_and_rejects_garbage() {
        let wrapped = r#"{"questions": [{"question": "Q?", "options": ["a","b","c","d"], "correctAnswer": 3, "concept": "c", "explanation": "because"}]}"#;
        let questions = parse_questions(wrapped).unwrap();
        assert_eq!(questions[0].explanation(), Some("because"));

        assert!(matches!(
            parse_questions("I cannot help with that"),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_questions("[]"),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn static_source_skips_excluded_prompts() {
        let source = StaticQuestionSource::builtin();
        let first = source.next_batch(&ticket(Vec::new())).await.unwrap();
        assert_eq!(first.len(), 5);

        let seen: Vec<String> = first.iter().map(|q| q.prompt().to_string()).collect();
        let second = source.next_batch(&ticket(seen.clone())).await.unwrap();
        assert!(second.iter().all(|q| !seen.contains(&q.prompt().to_string())));
    }
}
