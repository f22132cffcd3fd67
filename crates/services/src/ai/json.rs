/// Strip the markdown fences models like to wrap JSON in.
///
/// Removes every "```json" (with an optional trailing newline) and every
/// "```" (with an optional leading newline), then trims.
#[must_use]
pub fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json\n", "")
        .replace("```json", "")
        .replace("\n```", "")
        .replace("```", "")
        .trim()
        .to_string()
}
