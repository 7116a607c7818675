//! Mention and tag extraction.
//!
//! Finds `@handle` mentions and `#tag` references in free text. A marker only
//! counts when it starts a word, so e-mail addresses and `issue#12` are left
//! alone.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// `@` not preceded by a word character, followed by the handle
    static ref MENTION: Regex = Regex::new(r"(?:^|[^\w])@(\w+)").unwrap();

    /// `#` not preceded by a word character, followed by the tag name
    static ref TAG: Regex = Regex::new(r"(?:^|[^\w])#(\w[\w-]*)").unwrap();
}

/// Someone who can be mentioned.
pub trait Mentionable {
    /// Handles this person answers to, e.g. first name and initials.
    fn mentionable_handles(&self) -> Vec<String>;
}

/// Distinct mentioned handles in order of first appearance.
///
/// Uniqueness is case-insensitive; the first spelling wins.
pub fn scan_mentions(text: &str) -> Vec<String> {
    unique_captures(&MENTION, text)
}

/// Distinct `#tag` names (without the `#`) in order of first appearance.
pub fn scan_tags(text: &str) -> Vec<String> {
    unique_captures(&TAG, text)
}

/// The people `handles` refer to, in handle order.
///
/// Handles match case-insensitively. A handle nobody answers to is skipped,
/// and a person mentioned twice under different handles appears once.
pub fn resolve_mentionees<'a, U: Mentionable>(handles: &[String], users: &'a [U]) -> Vec<&'a U> {
    let mut seen = HashSet::new();

    handles
        .iter()
        .filter_map(|handle| {
            let handle = handle.to_lowercase();
            users.iter().enumerate().find(|(_, user)| {
                user.mentionable_handles()
                    .iter()
                    .any(|h| h.to_lowercase() == handle)
            })
        })
        .filter(|(index, _)| seen.insert(*index))
        .map(|(_, user)| user)
        .collect()
}

fn unique_captures(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    pattern
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}
