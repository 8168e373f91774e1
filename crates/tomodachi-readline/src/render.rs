//! Terminal rendering of transcript turns.

use colored::{Color, Colorize};
use tomodachi_core::config::ThemeConfig;
use tomodachi_core::persona::{MINORU_NAME, SHINYA_NAME, YUKARI_NAME};
use tomodachi_core::transcript::{Turn, TurnKind};

const FALLBACK_COLOR: Color = Color::BrightMagenta;

/// Formats turns with avatars and the theme's header color.
#[derive(Debug, Clone)]
pub struct TurnRenderer {
    header_color: Color,
}

impl TurnRenderer {
    pub fn new(theme: &ThemeConfig) -> Self {
        Self {
            header_color: parse_hex_color(&theme.primary_color).unwrap_or(FALLBACK_COLOR),
        }
    }

    pub fn header_color(&self) -> Color {
        self.header_color
    }

    /// Renders one turn as a header line plus indented body lines.
    pub fn render(&self, turn: &Turn, user_name: &str) -> String {
        let label = if turn.is_user() {
            user_name
        } else {
            turn.speaker.as_str()
        };
        let header = format!("{} {}", avatar(turn), label);

        let mut out = match turn.kind {
            TurnKind::Error => header.red().bold().to_string(),
            _ => header.color(self.header_color).bold().to_string(),
        };
        for line in turn.utterance.lines() {
            out.push('\n');
            let body = format!("  {line}");
            match turn.kind {
                TurnKind::Error => out.push_str(&body.red().to_string()),
                TurnKind::User => out.push_str(&body.green().to_string()),
                _ => out.push_str(&body),
            }
        }
        out
    }
}

/// Avatar glyph for a turn.
pub fn avatar(turn: &Turn) -> &'static str {
    match turn.kind {
        TurnKind::User => "👤",
        TurnKind::Quiz => "❓",
        TurnKind::ImageAnalysis => "🖼️",
        TurnKind::Error | TurnKind::Summary => "🤖",
        TurnKind::Dialogue => match turn.speaker.as_str() {
            YUKARI_NAME => "🌸",
            SHINYA_NAME => "🌊",
            MINORU_NAME => "🍀",
            "" => "🤖",
            _ => "⭐",
        },
    }
}

/// Parses `#rrggbb` (or `rrggbb`) into a true color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::TrueColor {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}
