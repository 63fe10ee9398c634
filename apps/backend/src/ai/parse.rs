//! Turning free provider text into a game choice.

use lazy_regex::regex_replace_all;

use crate::domain::ids::PlayerId;

/// Strip reasoning markup and keep the last line of visible text.
pub fn sanitize(raw: &str) -> String {
    let without_blocks = regex_replace_all!(
        r"(?is)<(think|thinking|reasoning)>.*?</(think|thinking|reasoning)>",
        raw,
        ""
    );
    // An unclosed block hides everything after it.
    let visible = match without_blocks.to_ascii_lowercase().find("<think") {
        Some(idx) => without_blocks[..idx].to_string(),
        None => without_blocks.into_owned(),
    };
    let visible = regex_replace_all!(r"</?[A-Za-z][^>]*>", &visible, "");

    visible
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(|line| {
            line.trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '`' | '.' | '!'))
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Match `text` against candidate names, case-insensitively.
///
/// Exact match first, then the longest candidate name contained in the
/// text, then a candidate whose name contains the text.
pub fn match_candidate(text: &str, candidates: &[(PlayerId, String)]) -> Option<PlayerId> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some((id, _)) = candidates
        .iter()
        .find(|(_, name)| name.to_lowercase() == needle)
    {
        return Some(*id);
    }

    if let Some((id, _)) = candidates
        .iter()
        .filter(|(_, name)| !name.is_empty() && needle.contains(&name.to_lowercase()))
        .max_by_key(|(_, name)| name.chars().count())
    {
        return Some(*id);
    }

    let mut containing = candidates
        .iter()
        .filter(|(_, name)| name.to_lowercase().contains(&needle));
    match (containing.next(), containing.next()) {
        (Some((id, _)), None) => Some(*id),
        _ => None,
    }
}
