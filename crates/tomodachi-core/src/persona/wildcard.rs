//! Selection of the wildcard character.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::model::WildcardPersona;
use super::preset::default_wildcard_candidates;

/// Whether the wildcard character persists for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardMode {
    /// Chosen on first need and kept until the session is reset.
    #[default]
    FixedPerSession,
    /// Chosen again for every prompt.
    RegeneratedPerTurn,
}

impl std::str::FromStr for WildcardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed_per_session" | "fixed" => Ok(Self::FixedPerSession),
            "regenerated_per_turn" | "regenerated" => Ok(Self::RegeneratedPerTurn),
            other => Err(format!("unknown wildcard mode: {other}")),
        }
    }
}

/// Picks the wildcard character from a custom definition or the candidates.
#[derive(Debug, Clone)]
pub struct WildcardGenerator {
    custom: Option<WildcardPersona>,
    candidates: Vec<WildcardPersona>,
}

impl Default for WildcardGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WildcardGenerator {
    pub fn new(custom: Option<WildcardPersona>) -> Self {
        Self {
            custom,
            candidates: default_wildcard_candidates(),
        }
    }

    /// Replaces the random candidate list.
    pub fn with_candidates(mut self, candidates: Vec<WildcardPersona>) -> Self {
        if !candidates.is_empty() {
            self.candidates = candidates;
        }
        self
    }

    pub fn custom(&self) -> Option<&WildcardPersona> {
        self.custom.as_ref()
    }

    pub fn candidates(&self) -> &[WildcardPersona] {
        &self.candidates
    }

    /// Returns the custom persona if set, otherwise a uniformly random candidate.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> WildcardPersona {
        if let Some(custom) = &self.custom {
            return custom.clone();
        }
        self.candidates
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| default_wildcard_candidates().remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_custom_persona_used_verbatim() {
        let custom = WildcardPersona::new("はると", "陽気で話好き");
        let generator = WildcardGenerator::new(Some(custom.clone()));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5 {
            assert_eq!(generator.pick(&mut rng), custom);
        }
    }

    #[test]
    fn test_random_pick_is_a_candidate() {
        let generator = WildcardGenerator::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let picked = generator.pick(&mut rng);
            assert!(generator.candidates().contains(&picked));
        }
    }

    #[test]
    fn test_random_pick_covers_candidates() {
        let generator = WildcardGenerator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(generator.pick(&mut rng).name);
        }
        assert_eq!(seen.len(), generator.candidates().len());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "fixed_per_session".parse::<WildcardMode>(),
            Ok(WildcardMode::FixedPerSession)
        );
        assert_eq!(
            "regenerated".parse::<WildcardMode>(),
            Ok(WildcardMode::RegeneratedPerTurn)
        );
        assert!("sometimes".parse::<WildcardMode>().is_err());
    }
}
