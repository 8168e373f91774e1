//! Test-time-augmented image classification.
//!
//! [`TtaClassifier`] wraps any [`LogitsModel`]: it decodes the uploaded bytes,
//! runs the model on a few geometric variants of the image, averages the
//! logits, and ranks the labels once on the averaged vector.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tomodachi_core::TomodachiError;
use tomodachi_core::error::Result;
use tomodachi_core::vision::{
    Classification, DEFAULT_TOP_K, ImageClassifier, average_logits, softmax, top_k,
};

/// A pretrained classifier producing one logit per label.
pub trait LogitsModel: Send + Sync {
    /// Width and height the model expects.
    fn input_size(&self) -> (u32, u32);

    /// Class names, indexed like the logits.
    fn labels(&self) -> &[String];

    fn forward(&self, image: &RgbImage) -> Result<Vec<f32>>;
}

/// Geometric variant fed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Augmentation {
    Identity,
    FlipHorizontal,
    FlipVertical,
    Rotate180,
}

impl Augmentation {
    pub fn apply(self, image: &RgbImage) -> RgbImage {
        match self {
            Self::Identity => image.clone(),
            Self::FlipHorizontal => imageops::flip_horizontal(image),
            Self::FlipVertical => imageops::flip_vertical(image),
            Self::Rotate180 => imageops::rotate180(image),
        }
    }
}

pub struct TtaClassifier<M> {
    model: M,
    augmentations: Vec<Augmentation>,
    top_k: usize,
}

impl<M: LogitsModel> TtaClassifier<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            augmentations: vec![Augmentation::Identity, Augmentation::FlipHorizontal],
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Replaces the augmentation set. An empty set means identity only.
    pub fn with_augmentations(mut self, augmentations: Vec<Augmentation>) -> Self {
        self.augmentations = if augmentations.is_empty() {
            vec![Augmentation::Identity]
        } else {
            augmentations
        };
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k.max(1);
        self
    }

    fn prepare(&self, image_bytes: &[u8]) -> Result<RgbImage> {
        let decoded = image::load_from_memory(image_bytes)
            .map_err(|e| TomodachiError::image(format!("Failed to decode image: {e}")))?;
        let (width, height) = self.model.input_size();
        Ok(decoded
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8())
    }
}

impl<M: LogitsModel> ImageClassifier for TtaClassifier<M> {
    fn classify(&self, image_bytes: &[u8]) -> Result<Vec<Classification>> {
        let base = self.prepare(image_bytes)?;

        let views = self
            .augmentations
            .iter()
            .map(|augmentation| self.model.forward(&augmentation.apply(&base)))
            .collect::<Result<Vec<_>>>()?;

        let averaged = average_logits(&views);
        if averaged.is_empty() {
            return Err(TomodachiError::image("Model returned no logits"));
        }

        let ranked = top_k(&softmax(&averaged), self.model.labels(), self.top_k);
        tracing::info!(
            views = views.len(),
            top = ranked.first().map(|c| c.label.as_str()).unwrap_or(""),
            "Image classified"
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::io::Cursor;

    /// Scores each channel by its mean intensity, plus one class for the
    /// brightness of the left half of the image.
    struct ChannelMeanModel {
        labels: Vec<String>,
    }

    impl ChannelMeanModel {
        fn new() -> Self {
            Self {
                labels: ["red", "green", "blue", "left-bright"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }
        }
    }

    impl LogitsModel for ChannelMeanModel {
        fn input_size(&self) -> (u32, u32) {
            (8, 8)
        }

        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn forward(&self, image: &RgbImage) -> Result<Vec<f32>> {
            let mut sums = [0f32; 3];
            let mut left = 0f32;
            for (x, _, pixel) in image.enumerate_pixels() {
                for c in 0..3 {
                    sums[c] += pixel[c] as f32 / 255.0;
                }
                if x < image.width() / 2 {
                    left += pixel[0] as f32 / 255.0;
                }
            }
            let n = (image.width() * image.height()) as f32;
            Ok(vec![
                4.0 * sums[0] / n,
                4.0 * sums[1] / n,
                4.0 * sums[2] / n,
                10.0 * left / n,
            ])
        }
    }

    fn encode(image: RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_top_three_descending() {
        let bytes = encode(RgbImage::from_pixel(16, 16, Rgb([230, 120, 10])));
        let classifier = TtaClassifier::new(ChannelMeanModel::new());

        let results = classifier.classify(&bytes).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        assert!(results.iter().all(|c| (0.0..=1.0).contains(&c.confidence)));
        let sum: f32 = results.iter().map(|c| c.confidence).sum();
        assert!(sum <= 1.0 + 1e-5);
        assert_eq!(results[0].label, "left-bright");
        assert_eq!(results[1].label, "red");
    }

    #[test]
    fn test_flip_is_averaged_before_ranking() {
        // Left half red, right half black.
        let image = RgbImage::from_fn(16, 16, |x, _| {
            if x < 8 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 0]) }
        });
        let bytes = encode(image);

        let plain = TtaClassifier::new(ChannelMeanModel::new())
            .with_augmentations(vec![Augmentation::Identity])
            .with_top_k(4);
        let tta = TtaClassifier::new(ChannelMeanModel::new()).with_top_k(4);

        let plain_results = plain.classify(&bytes).unwrap();
        let tta_results = tta.classify(&bytes).unwrap();

        let confidence = |results: &[Classification], label: &str| {
            results
                .iter()
                .find(|c| c.label == label)
                .map(|c| c.confidence)
                .unwrap()
        };
        assert_eq!(plain_results[0].label, "left-bright");
        assert!(
            confidence(&tta_results[..], "left-bright")
                < confidence(&plain_results[..], "left-bright")
        );
    }

    #[test]
    fn test_garbage_bytes_are_an_image_error() {
        let classifier = TtaClassifier::new(ChannelMeanModel::new());
        let err = classifier.classify(b"not an image").unwrap_err();
        assert!(err.is_image());
    }

    #[test]
    fn test_augmentations_preserve_size() {
        let image = RgbImage::from_pixel(4, 2, Rgb([1, 2, 3]));
        for augmentation in [
            Augmentation::Identity,
            Augmentation::FlipHorizontal,
            Augmentation::FlipVertical,
            Augmentation::Rotate180,
        ] {
            assert_eq!(augmentation.apply(&image).dimensions(), (4, 2));
        }
    }
}
