//! Recovers the three requested sections from a free-text model reply.
//!
//! The primary strategy looks for `<name>...</name>` tags. When the model
//! ignores the tag format, `explanation` falls back to keyword-bounded prose
//! and `improved_code` falls back to the first fenced code block. All
//! functions here are pure.

use serde::{Deserialize, Serialize};

/// Substituted when the model gave no further suggestions
pub const NO_SUGGESTIONS: &str = "None provided.";

const CODE_FENCE: &str = "```";

/// Keywords bounding the explanation when its tags are missing
const EXPLANATION_START_KEY: &str = "explanation";
const EXPLANATION_END_KEY: &str = "additional suggestions";

/// Language names recognized at the start of an info string that also
/// carries attributes (`python title="main.py"`)
const LANGUAGE_TOKENS: &[&str] = &[
    "python", "py", "java", "javascript", "js", "jsx", "typescript", "ts", "tsx", "c", "c#",
    "csharp", "cs", "cpp", "c++", "rust", "go", "lua", "gdscript", "glsl", "hlsl", "kotlin",
    "swift", "bash", "sh", "json", "html", "css",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ImprovedCode,
    Explanation,
    AdditionalSuggestions,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::ImprovedCode => "improved_code",
            Section::Explanation => "explanation",
            Section::AdditionalSuggestions => "additional_suggestions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub improved_code: String,
    pub explanation: String,
    pub additional_suggestions: String,
}

/// Text between the first `<section_name>` and the next `</section_name>`,
/// trimmed. Without a closing tag everything after the opening tag is
/// returned. Returns an empty string when the opening tag is absent.
pub fn extract_section(content: &str, section_name: &str) -> String {
    let start_tag = format!("<{}>", section_name);
    let end_tag = format!("</{}>", section_name);

    let Some(start) = content.find(&start_tag) else {
        return String::new();
    };
    let body = &content[start + start_tag.len()..];

    match body.find(&end_tag) {
        Some(end) => body[..end].trim().to_string(),
        None => body.trim().to_string(),
    }
}

/// Keyword-bounded recovery for replies that ignored the tag format.
///
/// Both keys match ASCII case-insensitively. The result starts at the start
/// keyword and runs up to the first end keyword after it, or to the end of
/// the content. The end keyword is only searched for after the start
/// keyword: an occurrence earlier in the reply is ignored rather than
/// producing an empty slice.
pub fn extract_fallback(content: &str, start_key: &str, end_key: &str) -> String {
    // ASCII lowering keeps byte offsets valid for `content`
    let lower = content.to_ascii_lowercase();

    let Some(start) = lower.find(&start_key.to_ascii_lowercase()) else {
        return String::new();
    };
    let search_from = start + start_key.len();

    match lower[search_from..].find(&end_key.to_ascii_lowercase()) {
        Some(offset) => content[start..search_from + offset].trim().to_string(),
        None => content[start..].trim().to_string(),
    }
}

/// Body of the first fenced code block, minus its info string.
///
/// Returns an empty string when the content has no fence.
pub fn extract_fenced_code(content: &str) -> String {
    let Some(block) = content.split(CODE_FENCE).nth(1) else {
        return String::new();
    };

    let (first_line, rest) = block.split_once('\n').unwrap_or((block, ""));
    let code = if is_info_string(first_line) {
        rest
    } else {
        block
    };

    code.trim().to_string()
}

/// Whether the text on the opening fence line names a language rather
/// than starting the code.
///
/// A single token made of identifier and path characters is always an info
/// string (`python3`, `tsx`, `javascript:main.js`). A line with spaces only
/// counts when its first token starts with a known language followed by a
/// non-alphanumeric boundary, so `tsum = 0` stays code.
fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return false;
    };

    if tokens.next().is_none() {
        return first.chars().all(is_info_char);
    }

    let first = first.to_ascii_lowercase();
    LANGUAGE_TOKENS.iter().any(|lang| {
        first.strip_prefix(lang).is_some_and(|tail| {
            tail.chars()
                .next()
                .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
        })
    })
}

fn is_info_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '#' | '.' | ':' | '/')
}

/// Run every strategy and apply the default-value policy.
pub fn extract_all(content: &str) -> ExtractionResult {
    let mut improved_code = extract_section(content, Section::ImprovedCode.as_str());
    let mut explanation = extract_section(content, Section::Explanation.as_str());
    let mut additional_suggestions =
        extract_section(content, Section::AdditionalSuggestions.as_str());

    if improved_code.is_empty() && content.contains(CODE_FENCE) {
        improved_code = extract_fenced_code(content);
    }

    if explanation.is_empty() {
        explanation = extract_fallback(content, EXPLANATION_START_KEY, EXPLANATION_END_KEY);
    }

    if additional_suggestions.is_empty() {
        additional_suggestions = NO_SUGGESTIONS.to_string();
    }

    ExtractionResult {
        improved_code,
        explanation,
        additional_suggestions,
    }
}
