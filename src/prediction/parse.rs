//! Extraction of the JSON verdict from free-form reasoning-engine text.

use crate::error::{Error, Result};
use crate::models::prediction::AiAnalysis;

/// End index (exclusive) of the balanced object starting at `start`, which
/// must point at `{`. Braces inside JSON strings are ignored.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Every balanced `{...}` block in order of its opening brace.
pub fn json_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|(_, ch)| *ch == '{')
        .filter_map(move |(start, _)| balanced_end(text, start).map(|end| &text[start..end]))
}

/// The first balanced `{...}` block, ignoring any surrounding prose.
pub fn extract_json_block(text: &str) -> Option<&str> {
    json_blocks(text).next()
}

/// Parse the verdict out of `text`.
///
/// Blocks are tried in order so a stray brace pair in leading commentary
/// does not hide the real object. Field values are passed through as given.
pub fn parse_analysis(text: &str) -> Result<AiAnalysis> {
    let mut last_error = None;
    for block in json_blocks(text) {
        match serde_json::from_str::<AiAnalysis>(block) {
            Ok(analysis) => return Ok(analysis),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => Error::malformed(format!("reasoning engine JSON rejected: {}", e)),
        None => Error::malformed("no JSON object in reasoning engine response"),
    })
}
