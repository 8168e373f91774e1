//! Keyword scoring of user questions.

const EMOTIONAL_KEYWORDS: [&str; 4] = ["困った", "悩み", "苦しい", "辛い"];
const LOGICAL_KEYWORDS: [&str; 4] = ["理由", "原因", "仕組み", "方法"];

/// Scores how emotional (positive) or logical (negative) a question reads.
///
/// Each emotional keyword present adds one, each logical keyword present
/// subtracts one. Repeated occurrences of the same keyword count once.
pub fn analyze_question(question: &str) -> i32 {
    let emotional = EMOTIONAL_KEYWORDS
        .iter()
        .filter(|word| question.contains(*word))
        .count() as i32;
    let logical = LOGICAL_KEYWORDS
        .iter()
        .filter(|word| question.contains(*word))
        .count() as i32;
    emotional - logical
}

/// Returns true when the score selects the empathetic register.
///
/// Zero is treated like a logical question.
pub fn is_emotional(score: i32) -> bool {
    score > 0
}
