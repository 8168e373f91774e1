//! Builds per-turn character styles from the question and the AI's age.

use super::model::{CharacterStyle, PersonaParams};
use super::preset::{MINORU_NAME, SHINYA_NAME, YUKARI_NAME};
use super::scorer::{analyze_question, is_emotional};

/// Age range the characters are asked to act in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    /// Under 30.
    Young,
    /// 30 to 49.
    Middle,
    /// 50 and over.
    Senior,
}

impl AgeBracket {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=29 => Self::Young,
            30..=49 => Self::Middle,
            _ => Self::Senior,
        }
    }
}

fn yukari_style(bracket: AgeBracket) -> CharacterStyle {
    match bracket {
        AgeBracket::Young => {
            CharacterStyle::new("明るくはっちゃけた", "とにかくエネルギッシュでポジティブな回答")
        }
        AgeBracket::Middle => {
            CharacterStyle::new("温かく落ち着いた", "経験に基づいたバランスの取れた回答")
        }
        AgeBracket::Senior => CharacterStyle::new(
            "賢明で穏やかな",
            "豊富な経験と知識に基づいた落ち着いた回答",
        ),
    }
}

/// Styles for しんや and みのる.
fn pair_styles(bracket: AgeBracket, emotional: bool) -> (CharacterStyle, CharacterStyle) {
    match (bracket, emotional) {
        (AgeBracket::Young, true) => (
            CharacterStyle::new("共感的", "若々しい感性で共感しながら答える"),
            CharacterStyle::new("柔軟", "自由な発想で斬新な視点から回答する"),
        ),
        (AgeBracket::Young, false) => (
            CharacterStyle::new("分析的", "新しい視点を持ちつつ、若々しく冷静に答える"),
            CharacterStyle::new("客観的", "柔軟な思考で率直に事実を述べる"),
        ),
        (AgeBracket::Middle, true) => (
            CharacterStyle::new("共感的", "深い理解と共感を込めた回答"),
            CharacterStyle::new("柔軟", "実務的な視点から多角的な意見を提供"),
        ),
        (AgeBracket::Middle, false) => (
            CharacterStyle::new("分析的", "冷静な視点から根拠をもって説明する"),
            CharacterStyle::new("客観的", "理論的かつ中立的な視点で回答する"),
        ),
        (AgeBracket::Senior, true) => (
            CharacterStyle::new("共感的", "深い洞察と共感で優しく答える"),
            CharacterStyle::new("柔軟", "多面的な知見から慎重に意見を述べる"),
        ),
        (AgeBracket::Senior, false) => (
            CharacterStyle::new("分析的", "豊かな経験に基づいた緻密な説明"),
            CharacterStyle::new("客観的", "慎重かつ冷静に事実を丁寧に伝える"),
        ),
    }
}

/// Chooses each fixed character's style for this turn.
///
/// Pure: the result depends only on the age bracket and the sign of the
/// question's score.
pub fn adjust_parameters(question: &str, ai_age: u32) -> PersonaParams {
    let bracket = AgeBracket::from_age(ai_age);
    let emotional = is_emotional(analyze_question(question));
    let (shinya, minoru) = pair_styles(bracket, emotional);

    let mut params = PersonaParams::new();
    params.insert(YUKARI_NAME, yukari_style(bracket));
    params.insert(SHINYA_NAME, shinya);
    params.insert(MINORU_NAME, minoru);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_brackets() {
        assert_eq!(AgeBracket::from_age(1), AgeBracket::Young);
        assert_eq!(AgeBracket::from_age(29), AgeBracket::Young);
        assert_eq!(AgeBracket::from_age(30), AgeBracket::Middle);
        assert_eq!(AgeBracket::from_age(49), AgeBracket::Middle);
        assert_eq!(AgeBracket::from_age(50), AgeBracket::Senior);
        assert_eq!(AgeBracket::from_age(120), AgeBracket::Senior);
    }

    #[test]
    fn test_emotional_question_selects_empathetic_register() {
        let params = adjust_parameters("最近仕事で悩みがある", 30);
        assert_eq!(params.get(SHINYA_NAME).unwrap().style, "共感的");
        assert_eq!(params.get(MINORU_NAME).unwrap().style, "柔軟");
        assert_eq!(params.get(YUKARI_NAME).unwrap().style, "温かく落ち着いた");
    }

    #[test]
    fn test_neutral_question_selects_analytical_register() {
        let params = adjust_parameters("image analysis", 20);
        assert_eq!(params.get(SHINYA_NAME).unwrap().style, "分析的");
        assert_eq!(params.get(MINORU_NAME).unwrap().style, "客観的");
        assert_eq!(params.get(YUKARI_NAME).unwrap().style, "明るくはっちゃけた");
    }

    #[test]
    fn test_senior_details() {
        let params = adjust_parameters("辛い", 70);
        assert_eq!(
            params.get(SHINYA_NAME).unwrap().detail,
            "深い洞察と共感で優しく答える"
        );
        assert_eq!(params.get(YUKARI_NAME).unwrap().style, "賢明で穏やかな");
    }

    #[test]
    fn test_is_deterministic() {
        for age in [5, 30, 45, 80] {
            for text in ["", "悩み", "理由", "悩みの理由"] {
                assert_eq!(adjust_parameters(text, age), adjust_parameters(text, age));
            }
        }
    }

    #[test]
    fn test_prompt_order_is_fixed() {
        let params = adjust_parameters("", 30);
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec![YUKARI_NAME, SHINYA_NAME, MINORU_NAME]);
    }
}
