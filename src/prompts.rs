//! Model instructions for every AI-facing pipeline stage.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — adjusting how rewrites, quizzes, or the
//!    tutoring persona behave means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompts without
//!    calling a real model, so prompt regressions are easy to catch.

/// System message for stages that must answer with machine-parseable JSON.
pub const JSON_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that outputs strictly JSON.";

/// Instruction sent to the vision model for uploaded images.
pub const IMAGE_DESCRIPTION_PROMPT: &str = "Describe the educational content of this image \
in detail. Focus on the scientific or academic concepts shown.";

/// Build the rewrite instruction for `text` targeted at `culture`.
///
/// Conceptual clarity is ranked above cultural flavouring on purpose: the
/// cultural adaptation is advisory, applied only where it aids
/// comprehension. The model must reply with a JSON object holding exactly
/// `rewritten_text` and `image_prompt`.
pub fn rewrite_prompt(text: &str, culture: &str) -> String {
    format!(
        r#"You are an expert educator known for making complex topics incredibly easy to understand (like Richard Feynman).

Input Text: "{text}"
Target Audience Context: "{culture}"

Task:
1.  **Analyze**: Deeply understand the core educational concept in the Input Text.
2.  **Simplify & Explain**: Rewrite the text to be crystal clear and easy to grasp.
    -   Focus on **Conceptual Clarity** above all else.
    -   Use simple, direct language.
    -   Use analogies or examples if they help understanding, but only if they are natural.
    -   *Subtly* adapt the tone and examples to be relatable to someone from {culture}, but DO NOT force it. If a "rural" example makes it confusing, don't use it.
    -   The goal is for the student to say "Oh, I get it now!", not "Why is this about farming?".
3.  **Visualize**: Create a prompt for an image generation model that depicts the *core concept* clearly.

Output JSON format:
{{
    "rewritten_text": "The clear, simplified explanation...",
    "image_prompt": "A clear, educational line art diagram of [concept]..."
}}

IMPORTANT: Output ONLY the JSON."#
    )
}

/// Build the quiz-generation instruction for explanatory `text`.
pub fn quiz_prompt(text: &str) -> String {
    format!(
        r#"Create a 3-question multiple-choice quiz to test understanding of the following concept.

Concept: "{text}"

Task:
1. Create 3 questions that test *conceptual understanding* (not just memory).
2. Relate the questions back to the simplified explanation.

Output JSON format:
{{
    "questions": [
        {{
            "question": "...",
            "options": ["A", "B", "C", "D"],
            "correct_answer": "A",
            "explanation": "..."
        }},
        ...
    ]
}}

IMPORTANT: Output ONLY the JSON."#
    )
}

/// Build the tutoring-persona system instruction.
///
/// The persona teaches Socratically: guiding questions over direct answers,
/// idioms and metaphors native to `culture`, and the lesson `context` woven
/// in when relevant.
pub fn persona_prompt(context: &str, culture: &str) -> String {
    format!(
        r#"You are a wise and patient mentor from {culture}.

Context of the lesson: "{context}"

Your Persona:
- You use local idioms and metaphors from {culture} naturally.
- You are Socratic: You ask guiding questions rather than just giving answers.
- You are kind and encouraging, like a favorite teacher or elder.
- If the user asks about the lesson, explain it using examples from {culture}.

Goal: Help the student understand the concept deeply."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_prompt_embeds_text_and_culture() {
        let p = rewrite_prompt("Photosynthesis", "rural Kenya");
        assert!(p.contains("Photosynthesis"));
        assert!(p.contains("rural Kenya"));
        assert!(p.contains("rewritten_text"));
        assert!(p.contains("image_prompt"));
    }

    #[test]
    fn quiz_prompt_requests_three_questions() {
        let p = quiz_prompt("gravity");
        assert!(p.contains("3-question"));
        assert!(p.contains("correct_answer"));
    }

    #[test]
    fn persona_prompt_is_socratic_and_cultured() {
        let p = persona_prompt("volcano lesson", "urban Japan");
        assert!(p.contains("urban Japan"));
        assert!(p.contains("volcano lesson"));
        assert!(p.contains("Socratic"));
    }
}
