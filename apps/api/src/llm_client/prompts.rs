// Shared prompt fragments. The narrative module owns its own prompt layout;
// cross-cutting instructions live here.

/// Appended to every generation prompt. The response is not checked for markdown.
pub const PLAIN_TEXT_INSTRUCTION: &str =
    "Don't use any styling like bold or underline (markdown), just plain text.";
