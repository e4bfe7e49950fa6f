//! Prompts for LLM-based memory categorization

/// Default categorization prompt
///
/// Placeholder: {memory} - the memory text to categorize. Templates without
/// the placeholder get the memory appended after a `User input:` label.
pub const MEMORY_CATEGORIZATION_PROMPT: &str = r#"Your task is to assign one or more categories to a piece of information a user wants remembered.

Guidelines:
- Prefer short, general topic labels (e.g. "work", "family", "health", "travel", "preferences")
- Use several categories when the information touches several topics
- Create a new label only when none of the common ones fit
- Do not repeat the input or explain your choice

User input: {memory}"#;

/// Instruction appended to every prompt describing the expected JSON shape
pub const RESPONSE_FORMAT_INSTRUCTION: &str = r#"Please respond with a JSON object in this format:
{"categories": ["category1", "category2", "category3"]}

Categories should be relevant, concise, and descriptive."#;

const MEMORY_PLACEHOLDER: &str = "{memory}";

/// Interpolate `memory` into `template` and append the JSON-shape instruction
pub fn build_prompt(template: &str, memory: &str) -> String {
    let body = if template.contains(MEMORY_PLACEHOLDER) {
        template.replace(MEMORY_PLACEHOLDER, memory)
    } else {
        format!("{template}\n\nUser input: {memory}")
    };

    format!("{body}\n\n{RESPONSE_FORMAT_INSTRUCTION}")
}
