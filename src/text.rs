use std::collections::HashSet;

/// Canonicalize a transcript against the legal character set: lowercase,
/// map every character outside the set to a space, collapse space runs,
/// and end with exactly one trailing space and none leading.
///
/// Idempotent, so it is safe to run over already-normalized text.
pub fn normalize_transcript(text: &str, legal_characters: &HashSet<char>) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        let c = if legal_characters.contains(&c) { c } else { ' ' };
        if c == ' ' && out.ends_with(' ') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches(' ');
    let mut result = String::with_capacity(trimmed.len() + 1);
    result.push_str(trimmed);
    result.push(' ');
    result
}
