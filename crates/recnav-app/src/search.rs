// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    Fuzzy,
    Contains,
    Prefix,
}

pub fn match_quality(text: &str, needle: &str) -> Option<MatchQuality> {
    if text.starts_with(needle) {
        Some(MatchQuality::Prefix)
    } else if text.contains(needle) {
        Some(MatchQuality::Contains)
    } else if is_subsequence(text, needle) {
        Some(MatchQuality::Fuzzy)
    } else {
        None
    }
}

fn is_subsequence(text: &str, needle: &str) -> bool {
    let mut wanted = needle.chars().peekable();
    for ch in text.chars() {
        if wanted.peek() == Some(&ch) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}

/// Finds the row whose label best matches `query`, scanning from `cursor`
/// and wrapping around. The first prefix match wins outright; otherwise the
/// first row with the best weaker match is returned.
pub fn find_match_index(
    query: &str,
    cursor: usize,
    total: usize,
    label: impl Fn(usize) -> String,
) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let cursor = if cursor < total { cursor } else { 0 };
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Some(cursor);
    }

    let mut best: Option<(MatchQuality, usize)> = None;
    for offset in 0..total {
        let index = (cursor + offset) % total;
        let text = label(index).trim().to_lowercase();
        if text.is_empty() {
            continue;
        }
        let Some(quality) = match_quality(&text, &needle) else {
            continue;
        };
        if quality == MatchQuality::Prefix {
            return Some(index);
        }
        if best.is_none_or(|(current, _)| quality > current) {
            best = Some((quality, index));
        }
    }
    best.map(|(_, index)| index)
}
