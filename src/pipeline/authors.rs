//! Author-field parsing and name formatting.
//!
//! The oracle's author field has no fixed shape: a single name, a
//! `"Last, First"` name, or a list joined by `;`, `" and "` or commas.
//! [`parse_authors`] runs an ordered list of delimiter rules and stops at the
//! first one that recognises the string.
//!
//! ## Rule Order
//!
//! 1. `;` anywhere → split on `;`
//! 2. `" and "` anywhere → split on it
//! 3. comma count + word count heuristic
//! 4. otherwise the whole string is one author
//!
//! A rule whose split leaves no non-empty segment declines, so the result is
//! never an empty list.

/// One delimiter rule: `Some(authors)` when it recognises the string.
type AuthorRule = fn(&str) -> Option<Vec<String>>;

/// Rules evaluated top to bottom; the last one always matches.
const AUTHOR_RULES: &[AuthorRule] = &[
    split_on_semicolons,
    split_on_and,
    split_on_commas_heuristic,
    whole_string,
];

/// Word count at or below which a single comma reads as `"Last, First"`.
const SINGLE_NAME_MAX_WORDS: usize = 3;

/// Split a sanitised author field into individual names, in order.
///
/// An empty input yields `[""]`; callers treat that as "no usable author".
pub fn parse_authors(author: &str) -> Vec<String> {
    AUTHOR_RULES
        .iter()
        .find_map(|rule| rule(author))
        .unwrap_or_else(|| vec![author.trim().to_string()])
}

fn split_trimmed(s: &str, delimiter: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = s
        .split(delimiter)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

// ── Rule 1: semicolons ───────────────────────────────────────────────────────

fn split_on_semicolons(s: &str) -> Option<Vec<String>> {
    if s.contains(';') {
        split_trimmed(s, ";")
    } else {
        None
    }
}

// ── Rule 2: " and " ──────────────────────────────────────────────────────────

fn split_on_and(s: &str) -> Option<Vec<String>> {
    if s.contains(" and ") {
        split_trimmed(s, " and ")
    } else {
        None
    }
}

// ── Rule 3: comma heuristic ──────────────────────────────────────────────────

fn split_on_commas_heuristic(s: &str) -> Option<Vec<String>> {
    let commas = s.matches(',').count();
    let words = s.split_whitespace().count();
    match commas {
        0 => None,
        1 if words <= SINGLE_NAME_MAX_WORDS => Some(vec![s.trim().to_string()]),
        _ => split_trimmed(s, ","),
    }
}

// ── Rule 4: whole string ─────────────────────────────────────────────────────

fn whole_string(s: &str) -> Option<Vec<String>> {
    Some(vec![s.trim().to_string()])
}

// ── Formatting ───────────────────────────────────────────────────────────────

/// Turn `"Last, First"` into `"First Last"`.
///
/// Only the first two comma-separated parts are used; anything after a
/// second comma (a suffix such as `"Jr."`) is dropped. Names without a
/// comma are returned unchanged.
pub fn reformat_single_author(name: &str) -> String {
    if name.contains(',') {
        let parts: Vec<&str> = name.split(',').map(str::trim).collect();
        if parts.len() >= 2 {
            return format!("{} {}", parts[1], parts[0]);
        }
    }
    name.to_string()
}

/// Last name of an author in either `"Last, First"` or `"First Last"` form.
pub fn get_last_name(name: &str) -> String {
    let name = name.trim();
    if let Some((last, _)) = name.split_once(',') {
        return last.trim().to_string();
    }
    name.split_whitespace()
        .next_back()
        .unwrap_or(name)
        .to_string()
}
