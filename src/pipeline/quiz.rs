//! Quiz generation: explanatory text in, a fixed-size multiple-choice quiz
//! out.
//!
//! Model replies are schema-validated before use — question count, option
//! count, and membership of the correct answer — because a quiz that is
//! half-right is worse for callers than the documented failure signal. Any
//! provider, parse, or schema failure degrades to an empty question list;
//! this stage never fails the request.

use crate::pipeline::structured::decode_json_object;
use crate::prompts::{quiz_prompt, JSON_SYSTEM_PROMPT};
use crate::provider::{ChatMessage, CompletionOptions, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Questions per quiz.
pub const QUESTION_COUNT: usize = 3;
/// Options per question.
pub const OPTION_COUNT: usize = 4;

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: usize = 1024;

/// One multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly [`OPTION_COUNT`] entries after validation.
    pub options: Vec<String>,
    /// Always one of `options` after validation.
    pub correct_answer: String,
    pub explanation: String,
}

/// A generated quiz. An empty `questions` list signals generation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Whether this quiz satisfies the full generation contract.
    fn is_well_formed(&self) -> bool {
        self.questions.len() == QUESTION_COUNT
            && self.questions.iter().all(|q| {
                q.options.len() == OPTION_COUNT && q.options.contains(&q.correct_answer)
            })
    }
}

/// Generates conceptual-understanding quizzes from explanatory text.
#[derive(Clone)]
pub struct QuizGenerator {
    provider: Option<Arc<dyn Provider>>,
}

impl QuizGenerator {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Generate a quiz for `text`. Infallible by design; see module docs.
    pub async fn generate(&self, text: &str) -> Quiz {
        let Some(provider) = &self.provider else {
            return Quiz::default();
        };

        let messages = [
            ChatMessage::system(JSON_SYSTEM_PROMPT),
            ChatMessage::user(quiz_prompt(text)),
        ];
        let options = CompletionOptions {
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            json_object: true,
        };

        let completion = match provider.chat(&messages, &options).await {
            Ok(completion) => completion,
            Err(e) => {
                error!("quiz call failed: {e}");
                return Quiz::default();
            }
        };

        match decode_json_object::<Quiz>(&completion.content) {
            Ok(quiz) if quiz.is_well_formed() => quiz,
            Ok(quiz) => {
                warn!(
                    "quiz reply violated the schema ({} questions); discarding",
                    quiz.questions.len()
                );
                Quiz::default()
            }
            Err(e) => {
                warn!("quiz reply was not the expected JSON shape: {e}");
                Quiz::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::StubProvider;

    fn valid_quiz_json() -> String {
        let question = |n: usize| {
            format!(
                r#"{{
                    "question": "Q{n}?",
                    "options": ["w", "x", "y", "z"],
                    "correct_answer": "x",
                    "explanation": "because x"
                }}"#
            )
        };
        format!(
            r#"{{"questions": [{}, {}, {}]}}"#,
            question(1),
            question(2),
            question(3)
        )
    }

    #[tokio::test]
    async fn valid_reply_yields_three_questions_of_four_options() {
        let generator = QuizGenerator::new(Some(Arc::new(StubProvider::chatting(
            valid_quiz_json(),
        ))));
        let quiz = generator.generate("gravity pulls things down").await;
        assert_eq!(quiz.questions.len(), QUESTION_COUNT);
        for q in &quiz.questions {
            assert_eq!(q.options.len(), OPTION_COUNT);
            assert!(q.options.contains(&q.correct_answer));
        }
    }

    #[tokio::test]
    async fn missing_credential_yields_empty_quiz() {
        let quiz = QuizGenerator::new(None).generate("anything").await;
        assert!(quiz.questions.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_quiz() {
        let generator = QuizGenerator::new(Some(Arc::new(StubProvider::unreachable())));
        let quiz = generator.generate("anything").await;
        assert!(quiz.questions.is_empty());
    }

    #[tokio::test]
    async fn unparsable_reply_yields_empty_quiz() {
        let generator =
            QuizGenerator::new(Some(Arc::new(StubProvider::chatting("no json here"))));
        let quiz = generator.generate("anything").await;
        assert!(quiz.questions.is_empty());
    }

    #[tokio::test]
    async fn wrong_question_count_is_discarded() {
        let generator = QuizGenerator::new(Some(Arc::new(StubProvider::chatting(
            r#"{"questions": [{"question": "Q?", "options": ["a","b","c","d"], "correct_answer": "a", "explanation": "e"}]}"#,
        ))));
        let quiz = generator.generate("anything").await;
        assert!(quiz.questions.is_empty());
    }

    #[tokio::test]
    async fn answer_outside_options_is_discarded() {
        let question = r#"{"question": "Q?", "options": ["a","b","c","d"], "correct_answer": "nope", "explanation": "e"}"#;
        let generator = QuizGenerator::new(Some(Arc::new(StubProvider::chatting(format!(
            r#"{{"questions": [{question}, {question}, {question}]}}"#
        )))));
        let quiz = generator.generate("anything").await;
        assert!(quiz.questions.is_empty());
    }
}
