//! Image classification boundary and ranking helpers.
//!
//! The model itself is opaque: an implementation turns image bytes into a
//! ranked list of [`Classification`]s. The helpers here cover the part every
//! implementation shares: averaging logits across augmented views, softmax,
//! and top-k selection.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of labels reported per image.
pub const DEFAULT_TOP_K: usize = 3;

/// One predicted label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Probability in `[0, 1]`.
    pub confidence: f32,
}

/// Classifies encoded image bytes (PNG, JPEG).
pub trait ImageClassifier: Send + Sync {
    /// Returns labels sorted by descending confidence.
    fn classify(&self, image_bytes: &[u8]) -> Result<Vec<Classification>>;
}

/// Element-wise mean of several logit vectors.
///
/// Vectors of differing length are truncated to the shortest one. Returns an
/// empty vector for empty input.
pub fn average_logits(views: &[Vec<f32>]) -> Vec<f32> {
    let Some(len) = views.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    let count = views.len() as f32;
    (0..len)
        .map(|i| views.iter().map(|view| view[i]).sum::<f32>() / count)
        .collect()
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Picks the `k` most probable labels, highest first.
///
/// `labels[i]` names class `i`; classes without a label are reported as
/// `class_{i}`.
pub fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> Vec<Classification> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed
        .into_iter()
        .take(k)
        .map(|(idx, confidence)| Classification {
            label: labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{idx}")),
            confidence: confidence.clamp(0.0, 1.0),
        })
        .collect()
}

/// Formats results as `label (88.2%), label (2.1%)`.
pub fn describe(results: &[Classification]) -> String {
    results
        .iter()
        .map(|c| format!("{} ({:.1}%)", c.label, c.confidence * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("label{i}")).collect()
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[2.0, 1.0, 0.1, -3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_softmax_large_logits_are_stable() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_average_before_ranking() {
        // Each view alone would rank a different class first.
        let views = vec![vec![4.0, 0.0, 3.0], vec![0.0, 4.0, 3.0]];
        let averaged = average_logits(&views);
        assert_eq!(averaged, vec![2.0, 2.0, 3.0]);

        let ranked = top_k(&softmax(&averaged), &labels(3), 1);
        assert_eq!(ranked[0].label, "label2");
    }

    #[test]
    fn test_top_k_is_descending() {
        let probs = softmax(&[0.5, 3.0, 1.0, 2.0, -1.0]);
        let ranked = top_k(&probs, &labels(5), DEFAULT_TOP_K);
        assert_eq!(ranked.len(), 3);
        let names: Vec<&str> = ranked.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(names, vec!["label1", "label3", "label2"]);
        assert!(ranked.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        let sum: f32 = ranked.iter().map(|c| c.confidence).sum();
        assert!(sum <= 1.0 + 1e-5);
    }

    #[test]
    fn test_missing_label_falls_back_to_index() {
        let ranked = top_k(&[0.1, 0.9], &labels(1), 1);
        assert_eq!(ranked[0].label, "class_1");
    }

    #[test]
    fn test_describe_format() {
        let results = vec![
            Classification {
                label: "Maltese dog".to_string(),
                confidence: 0.882,
            },
            Classification {
                label: "Chihuahua".to_string(),
                confidence: 0.021,
            },
        ];
        assert_eq!(describe(&results), "Maltese dog (88.2%), Chihuahua (2.1%)");
    }

    #[test]
    fn test_average_of_nothing_is_empty() {
        assert!(average_logits(&[]).is_empty());
    }
}
