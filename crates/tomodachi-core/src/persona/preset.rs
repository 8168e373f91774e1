//! Fixed characters and the wildcard candidate list.

use super::model::WildcardPersona;

pub const YUKARI_NAME: &str = "ゆかり";
pub const SHINYA_NAME: &str = "しんや";
pub const MINORU_NAME: &str = "みのる";

/// Generic label the wildcard slot is known by in older transcripts.
pub const NEW_CHARACTER_LABEL: &str = "新キャラクター";

/// The fixed members, in prompt order.
pub const FIXED_CHARACTERS: [&str; 3] = [YUKARI_NAME, SHINYA_NAME, MINORU_NAME];

const WILDCARD_CANDIDATES: [(&str, &str); 5] = [
    ("たけし", "冷静沈着で皮肉屋、どこか孤高な存在"),
    ("さとる", "率直かつ辛辣で、常に現実を鋭く指摘する"),
    ("りさ", "自由奔放で斬新なアイデアを持つ、ユニークな感性の持ち主"),
    ("けんじ", "クールで合理的、論理に基づいた意見を率直に述べる"),
    ("なおみ", "独創的で個性的、常識にとらわれず新たな視点を提供する"),
];

/// Returns the built-in wildcard candidates.
pub fn default_wildcard_candidates() -> Vec<WildcardPersona> {
    WILDCARD_CANDIDATES
        .iter()
        .map(|(name, description)| WildcardPersona::new(*name, *description))
        .collect()
}
