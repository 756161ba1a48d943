// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::header::normalize_header_key;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Upper bound for the width a single cell can ask for.
pub const MAX_COLUMN_WIDTH: usize = 60;

/// Characters kept when a UUID is shortened in an ID-like column.
pub const ID_ABBREVIATION_WIDTH: usize = 5;

pub const ELLIPSIS: char = '…';

pub fn display_width(value: &str) -> usize {
    UnicodeWidthStr::width(value)
}

/// Computes per-column widths for a table.
///
/// Returns `(widths, min_widths)`. A column's minimum is its header's display
/// width; its desired width is the widest cell (capped at
/// [`MAX_COLUMN_WIDTH`]) but never narrower than the header. When the desired
/// total exceeds `max_total`, columns give back width in proportion to how far
/// they sit above their minimum. A `max_total` of zero means unbounded.
/// Leftover budget is not handed out, so the result never grows a column past
/// its desired width.
pub fn compute_column_widths<H, C>(
    headers: &[H],
    rows: &[Vec<C>],
    max_total: usize,
) -> (Vec<usize>, Vec<usize>)
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let min_widths: Vec<usize> = headers
        .iter()
        .map(|header| display_width(header.as_ref()))
        .collect();

    let mut widths = min_widths.clone();
    for row in rows {
        for (index, cell) in row.iter().enumerate().take(widths.len()) {
            let cell_width = display_width(cell.as_ref()).min(MAX_COLUMN_WIDTH);
            if cell_width > widths[index] {
                widths[index] = cell_width;
            }
        }
    }

    let total: usize = widths.iter().sum();
    if max_total == 0 || total <= max_total {
        return (widths, min_widths);
    }

    let floor: usize = min_widths.iter().sum();
    if floor >= max_total {
        return (min_widths.clone(), min_widths);
    }

    let excess = total - max_total;
    let slack: Vec<usize> = widths
        .iter()
        .zip(&min_widths)
        .map(|(width, min)| width - min)
        .collect();
    let total_slack: usize = slack.iter().sum();

    let mut removed = 0;
    for (index, column_slack) in slack.iter().enumerate() {
        let cut = excess * column_slack / total_slack;
        widths[index] -= cut;
        removed += cut;
    }

    // Integer division leaves a few columns over budget; take them from the
    // widest columns that still have room.
    while removed < excess {
        let Some(index) = widest_shrinkable(&widths, &min_widths) else {
            break;
        };
        widths[index] -= 1;
        removed += 1;
    }

    (widths, min_widths)
}

fn widest_shrinkable(widths: &[usize], min_widths: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, (&width, &min)) in widths.iter().zip(min_widths).enumerate() {
        if width <= min {
            continue;
        }
        match best {
            Some(current) if widths[current] >= width => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Cuts `value` so it fits in `max_width` display columns, marking the cut
/// with a trailing ellipsis.
pub fn truncate_with_ellipsis(value: &str, max_width: usize) -> String {
    if display_width(value) <= max_width {
        return value.to_owned();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in value.chars() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

/// Truncates then right-pads `value` to exactly `width` display columns.
pub fn fit_to_width(value: &str, width: usize) -> String {
    let mut cell = truncate_with_ellipsis(value, width);
    let used = display_width(&cell);
    if used < width {
        cell.push_str(&" ".repeat(width - used));
    }
    cell
}

/// Shortens a value for one-line summaries. UUIDs collapse to their first
/// few characters instead of the full limit.
pub fn abbreviate_value(value: &str, limit: usize) -> String {
    let value = value.trim();
    if limit == 0 || value.chars().count() <= limit {
        return value.to_owned();
    }
    if is_likely_uuid(value) && limit >= ID_ABBREVIATION_WIDTH {
        return truncate_with_ellipsis(value, ID_ABBREVIATION_WIDTH);
    }
    if limit == 1 {
        return value.chars().take(1).collect();
    }
    truncate_with_ellipsis(value, limit)
}

pub fn is_likely_uuid(value: &str) -> bool {
    let trimmed = value.trim();
    match trimmed.len() {
        36 => trimmed.char_indices().all(|(index, ch)| match index {
            8 | 13 | 18 | 23 => ch == '-',
            _ => ch.is_ascii_hexdigit(),
        }),
        32 => trimmed.chars().all(|ch| ch.is_ascii_hexdigit()),
        _ => false,
    }
}

pub fn is_id_header(header: &str) -> bool {
    let key = normalize_header_key(header);
    if matches!(key.as_str(), "id" | "uuid" | "uid" | "identifier") {
        return true;
    }
    [" id", " uuid", " uid", " identifier"]
        .iter()
        .any(|suffix| key.ends_with(suffix))
}

/// Shortens UUID cells in ID-like columns so they do not crowd the table.
pub fn abbreviate_id_columns(headers: &[String], rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let id_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| is_id_header(header))
        .map(|(index, _)| index)
        .collect();

    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            for &index in &id_columns {
                if let Some(cell) = row.get_mut(index) {
                    let trimmed = cell.trim();
                    if is_likely_uuid(trimmed) {
                        *cell = truncate_with_ellipsis(trimmed, ID_ABBREVIATION_WIDTH);
                    }
                }
            }
            row
        })
        .collect()
}
