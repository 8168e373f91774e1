//! Parser for the `name: utterance` completion grammar.
//!
//! The prompt asks the model to answer with one `name: utterance` line per
//! character. This module is the only place that knows about that string
//! convention; everything downstream works with [`Turn`] values.

use super::model::Turn;

const COLONS: [char; 2] = [':', '：'];

/// Splits one line into `(speaker, utterance)`.
///
/// The split happens on the first ASCII or full-width colon. A line without
/// any colon has an empty speaker and the whole line as utterance.
pub fn split_line(line: &str) -> (&str, &str) {
    match line.find(COLONS) {
        Some(idx) => {
            let colon_len = line[idx..].chars().next().map_or(1, char::len_utf8);
            (line[..idx].trim(), line[idx + colon_len..].trim())
        }
        None => ("", line.trim()),
    }
}

/// Parses a raw completion into dialogue turns, in line order.
///
/// Blank lines are dropped. Unknown speakers are accepted as-is since the
/// wildcard character's name is chosen at runtime.
pub fn parse_completion(raw: &str) -> Vec<Turn> {
    let turns: Vec<Turn> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (speaker, utterance) = split_line(line);
            Turn::dialogue(speaker, utterance)
        })
        .collect();

    tracing::debug!("Parsed {} dialogue turns from completion", turns.len());
    turns
}
