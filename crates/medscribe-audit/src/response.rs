//! Raw model-response plumbing shared by both auditors.
//!
//! Models frequently wrap their JSON in prose or markdown code fences even
//! when told not to. These helpers pull the payload out before parsing.

/// Extract the first balanced `{...}` block from raw response text.
///
/// Brace counting is string-aware: braces inside JSON string literals do not
/// affect the depth. Returns `None` when no balanced block exists.
#[must_use = "returns the extracted JSON block, if any"]
pub fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a surrounding markdown code fence, if present.
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` fences; text without
/// a fence is returned trimmed.
#[must_use = "returns the fence-stripped text"]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
