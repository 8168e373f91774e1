//! Quiz mini-game.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const QUIZ_BANK: [(&str, &str); 4] = [
    ("日本の首都は？", "東京"),
    ("富士山の標高は何メートル？", "3776"),
    ("寿司の主な具材は何？", "酢飯"),
    ("桜の花言葉は？", "美しさ"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub answer: String,
}

impl QuizItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Text announcing the question.
    pub fn announcement(&self) -> String {
        format!("クイズ: {}", self.question)
    }

    /// Compares trimmed, lowercased answers.
    pub fn grade(&self, reply: &str) -> QuizOutcome {
        if reply.trim().to_lowercase() == self.answer.trim().to_lowercase() {
            QuizOutcome::Correct
        } else {
            QuizOutcome::Incorrect {
                answer: self.answer.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    Correct,
    Incorrect { answer: String },
}

impl QuizOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Correct => "正解です！おめでとうございます！".to_string(),
            Self::Incorrect { answer } => format!("残念、不正解です。正解は {answer} です。"),
        }
    }
}

pub fn quiz_bank() -> Vec<QuizItem> {
    QUIZ_BANK
        .iter()
        .map(|(question, answer)| QuizItem::new(*question, *answer))
        .collect()
}

/// Picks a random question from the bank.
pub fn pick_quiz<R: Rng + ?Sized>(rng: &mut R) -> QuizItem {
    let (question, answer) = QUIZ_BANK.choose(rng).copied().unwrap_or(QUIZ_BANK[0]);
    QuizItem::new(question, answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_grade_ignores_case_and_whitespace() {
        let quiz = QuizItem::new("Capital of Japan?", "Tokyo");
        assert_eq!(quiz.grade("  tokyo "), QuizOutcome::Correct);
        assert_eq!(
            quiz.grade("Osaka"),
            QuizOutcome::Incorrect {
                answer: "Tokyo".to_string()
            }
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(QuizOutcome::Correct.message(), "正解です！おめでとうございます！");
        let wrong = QuizItem::new("日本の首都は？", "東京").grade("大阪");
        assert_eq!(wrong.message(), "残念、不正解です。正解は 東京 です。");
    }

    #[test]
    fn test_pick_comes_from_bank() {
        let mut rng = StdRng::seed_from_u64(3);
        let bank = quiz_bank();
        for _ in 0..10 {
            assert!(bank.contains(&pick_quiz(&mut rng)));
        }
    }
}
