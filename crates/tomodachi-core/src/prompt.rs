//! Prompt assembly.
//!
//! Every prompt ends by asking for one `name: 発言内容` line per character.
//! [`crate::transcript::parse_completion`] depends on that grammar, so the
//! closing block is produced in exactly one place, [`output_format`].

use std::fmt::Write as _;

use crate::persona::{PersonaParams, WildcardPersona};
use crate::transcript::Turn;

/// What the characters are asked to talk about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic<'a> {
    /// A question or remark typed by the user.
    Question(&'a str),
    /// A description of image classification results.
    ImageAnalysis(&'a str),
}

/// Inputs for one discussion prompt.
#[derive(Debug, Clone)]
pub struct DiscussionPrompt<'a> {
    pub user_name: &'a str,
    pub topic: Topic<'a>,
    pub ai_age: u32,
    pub params: &'a PersonaParams,
    pub wildcard: &'a WildcardPersona,
    /// Prior character turns, oldest first.
    pub history: &'a [&'a Turn],
    pub search_snippet: Option<&'a str>,
}

impl DiscussionPrompt<'_> {
    /// Number of characters expected to reply.
    pub fn participant_count(&self) -> usize {
        self.params.len() + 1
    }

    /// Names in the order the reply lines are requested.
    pub fn participant_names(&self) -> Vec<&str> {
        self.params
            .names()
            .chain(std::iter::once(self.wildcard.name.as_str()))
            .collect()
    }

    /// Renders the full instruction string.
    pub fn render(&self) -> String {
        let mut prompt = String::new();

        match self.topic {
            Topic::Question(question) => {
                let _ = write!(prompt, "【{}さんの質問】\n{}\n\n", self.user_name, question);
            }
            Topic::ImageAnalysis(analysis) => {
                let _ = write!(
                    prompt,
                    "【{}さんが画像をアップロードしました】\n解析結果: {}\n\n",
                    self.user_name, analysis
                );
            }
        }

        if !self.history.is_empty() {
            prompt.push_str("これまでの会話:\n");
            for turn in self.history {
                prompt.push_str(&turn.as_line());
                prompt.push('\n');
            }
            prompt.push('\n');
        }

        if let Some(snippet) = self.search_snippet.map(str::trim).filter(|s| !s.is_empty()) {
            let _ = write!(prompt, "参考情報（検索結果）: {}\n\n", snippet);
        }

        let _ = writeln!(prompt, "このAIは{}歳として振る舞います。", self.ai_age);
        for (name, style) in self.params.iter() {
            let _ = writeln!(prompt, "{}は【{}な視点】で、{}。", name, style.style, style.detail);
        }
        let _ = writeln!(
            prompt,
            "さらに、新キャラクターとして {} は【{}】な性格です。彼/彼女も会話に加わってください。",
            self.wildcard.name, self.wildcard.description
        );

        let count = self.participant_count();
        prompt.push('\n');
        match (self.topic, self.history.is_empty()) {
            (Topic::ImageAnalysis(_), _) => {
                let _ = writeln!(
                    prompt,
                    "{count}人は友達同士のように、この画像解析結果について気楽に話し合ってください。"
                );
                prompt.push_str("例えば、『犬っぽいけど毛の色が違うね』など自然な雑談をしてください。\n");
            }
            (Topic::Question(_), true) => {
                let _ = writeln!(
                    prompt,
                    "上記情報を元に、{count}人が友達同士のように自然な会話をしてください。"
                );
            }
            (Topic::Question(_), false) => {
                let _ = writeln!(
                    prompt,
                    "上記を踏まえ、{count}人がさらに自然な会話を続けてください。"
                );
            }
        }

        prompt.push_str(&output_format(&self.participant_names()));
        prompt
    }
}

/// The closing block that fixes the reply grammar.
pub fn output_format(names: &[&str]) -> String {
    let mut block = String::from("出力形式は以下の通りです。\n");
    for name in names {
        let _ = writeln!(block, "{name}: 発言内容");
    }
    block.push_str("余計なJSON形式は入れず、自然な日本語の会話のみを出力してください。");
    block
}

/// Asks for a wrap-up answer based on the discussion so far.
pub fn summary_prompt(discussion: &str, participant_count: usize) -> String {
    format!(
        "以下は{participant_count}人の会話内容です。\n{discussion}\n\n\
         この会話を踏まえて、質問に対するまとめ回答を生成してください。\n\
         自然な日本語文で出力し、余計なJSON形式は不要です。"
    )
}
