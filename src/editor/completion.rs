//! Word-under-cursor completion support.
//!
//! The session asks an injected lookup for candidates matching the
//! partial word left of the cursor. One candidate replaces the word;
//! several insert only their longest common prefix and surface a
//! capped candidate list as an ephemeral hint.

/// Most candidates shown in the hint before eliding.
pub const HINT_CAP: usize = 5;

/// Index where the word containing the cursor begins.
///
/// A word is a run of non-whitespace characters; the cursor may sit
/// just past its end.
pub fn word_start(chars: &[char], cursor: usize) -> usize {
    let mut start = cursor.min(chars.len());
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    start
}

/// Longest prefix shared by every candidate, on char boundaries.
pub fn longest_common_prefix(candidates: &[String]) -> String {
    let Some(first) = candidates.first() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.chars().collect();
    for candidate in &candidates[1..] {
        let mut matched = 0;
        for (a, b) in prefix.iter().zip(candidate.chars()) {
            if *a != b {
                break;
            }
            matched += 1;
        }
        prefix.truncate(matched);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}

/// One-line candidate listing, capped with a `+N more` tail.
pub fn hint_line(candidates: &[String]) -> String {
    let shown: Vec<&str> = candidates
        .iter()
        .take(HINT_CAP)
        .map(String::as_str)
        .collect();
    let mut line = shown.join("  ");
    if candidates.len() > HINT_CAP {
        line.push_str(&format!("  (+{} more)", candidates.len() - HINT_CAP));
    }
    line
}
