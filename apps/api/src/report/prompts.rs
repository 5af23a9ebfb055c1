//! Prompt Builder — deterministic assembly of the report prompt.

use crate::report::outline::Outline;

/// Lead-in that introduces the uploaded document as the report's source data.
pub const REPORT_SOURCE_INTRO: &str = "Create a report from the following data:";

/// Builds the user prompt for a report.
///
/// Layout:
/// ```text
/// {custom_instructions}          (omitted when blank)
///
/// Create a report from the following data:
/// {source_text}
///
/// Title: {title}
/// Word Limit: {word_limit}       (one block per outline entry, in order)
/// ```
pub fn build_prompt(source_text: &str, outline: &Outline, custom_instructions: &str) -> String {
    let mut prompt = String::new();

    let instructions = custom_instructions.trim();
    if !instructions.is_empty() {
        prompt.push_str(instructions);
        prompt.push_str("\n\n");
    }

    prompt.push_str(REPORT_SOURCE_INTRO);
    prompt.push('\n');
    prompt.push_str(source_text);
    prompt.push('\n');

    for entry in outline.entries() {
        prompt.push_str(&format!(
            "\nTitle: {}\nWord Limit: {}\n",
            entry.title, entry.word_limit
        ));
    }

    prompt
}
