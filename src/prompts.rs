//! Prompt template for document question answering.
//!
//! The whole document is stuffed into a single user message ahead of the
//! question. Keeping the template here means the session loop and the
//! completion client never hard-code prompt wording.

use crate::error::PdfQaError;

/// Lead-in placed before the document text.
pub const DOCUMENT_PREAMBLE: &str = "Based on the following document: ";

/// Lead-in placed before the user's question.
pub const QUESTION_PREAMBLE: &str = "\n\nAnswer the following question: ";

/// Assemble the prompt for one question.
///
/// Fails only when `max_chars` is set and the prompt exceeds it; the caller
/// reports that and moves on to the next question.
pub fn build_prompt(
    document: &str,
    query: &str,
    max_chars: Option<usize>,
) -> Result<String, PdfQaError> {
    let prompt = format!("{DOCUMENT_PREAMBLE}{document}{QUESTION_PREAMBLE}{query}");

    if let Some(max) = max_chars {
        let len = prompt.chars().count();
        if len > max {
            return Err(PdfQaError::PromptTooLarge { len, max });
        }
    }

    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_document_then_question() {
        let p = build_prompt("The sky is blue.", "What colour is the sky?", None).unwrap();
        assert_eq!(
            p,
            "Based on the following document: The sky is blue.\n\n\
             Answer the following question: What colour is the sky?"
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let doc = "é".repeat(10);
        let unlimited = build_prompt(&doc, "?", None).unwrap();
        let exact = unlimited.chars().count();
        assert!(build_prompt(&doc, "?", Some(exact)).is_ok());
        assert!(matches!(
            build_prompt(&doc, "?", Some(exact - 1)),
            Err(PdfQaError::PromptTooLarge { .. })
        ));
    }
}
