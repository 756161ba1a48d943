// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Turns an identifier such as `HTTPStatusCode` or `local_updated_time` into
/// an upper-case, space-separated column heading (`HTTP STATUS CODE`).
pub fn format_header(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            push_word(&mut words, &mut current);
            continue;
        }
        if index > 0 {
            let prev = chars[index - 1];
            let next = chars.get(index + 1).copied();
            if starts_new_word(prev, ch, next) {
                push_word(&mut words, &mut current);
            }
        }
        current.push(ch);
    }
    push_word(&mut words, &mut current);

    words
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_word(words: &mut Vec<String>, current: &mut String) {
    let word = current.trim();
    if !word.is_empty() {
        words.push(word.to_owned());
    }
    current.clear();
}

fn starts_new_word(prev: char, current: char, next: Option<char>) -> bool {
    if current.is_ascii_digit() && !prev.is_ascii_digit() {
        return true;
    }
    if !current.is_uppercase() {
        return false;
    }
    if !prev.is_uppercase() {
        return true;
    }
    // Inside an acronym: only the last capital before a lower-case run
    // begins a new word ("HTTPStatus" -> "HTTP" + "Status").
    next.is_some_and(char::is_lowercase)
}

/// Lower-cases a heading or label and folds `_`/`-` and repeated whitespace
/// into single spaces, so `Local_Updated-Time` and `LOCAL UPDATED TIME`
/// compare equal.
pub fn normalize_header_key(header: &str) -> String {
    header
        .trim()
        .replace(['_', '-'], " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn title_from_label(label: &str) -> String {
    label
        .trim()
        .split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    let mut word: String = first.to_uppercase().collect();
                    word.push_str(&chars.as_str().to_lowercase());
                    word
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Same key with all spaces removed; lets `display name` match `displayname`.
pub(crate) fn compact_key(key: &str) -> String {
    key.chars().filter(|ch| !ch.is_whitespace()).collect()
}
