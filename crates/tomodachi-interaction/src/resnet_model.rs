//! ResNet classifier loaded from a safetensors checkpoint.
//!
//! Pixels are scaled to `[0, 1]` and normalized with the ImageNet channel
//! statistics before the forward pass. Inference runs on the CPU.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Func, VarBuilder};
use candle_transformers::models::resnet;
use image::RgbImage;
use tomodachi_core::TomodachiError;
use tomodachi_core::config::{ResNetArchitecture, VisionSettings};
use tomodachi_core::error::Result;

use crate::image_classifier::LogitsModel;

const INPUT_SIZE: u32 = 224;
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct ResNetModel {
    model: Func<'static>,
    labels: Vec<String>,
    device: Device,
}

impl ResNetModel {
    /// Loads the checkpoint and labels named by `[vision]`, resolving
    /// relative paths against `base_dir`.
    pub fn load(settings: &VisionSettings, base_dir: &Path) -> Result<Self> {
        let model_path = resolve(base_dir, &settings.model_path);
        let labels_path = resolve(base_dir, &settings.labels_path);

        let labels = read_labels(&labels_path)?;
        let weights = std::fs::read(&model_path).map_err(|e| {
            TomodachiError::io(format!("Failed to read {}: {e}", model_path.display()))
        })?;

        let device = Device::Cpu;
        let vb = VarBuilder::from_buffered_safetensors(weights, DType::F32, &device)
            .map_err(model_error)?;
        let model = Self::from_var_builder(vb, labels, settings.architecture)?;
        tracing::info!(
            path = %model_path.display(),
            architecture = ?settings.architecture,
            classes = model.labels.len(),
            "Image model loaded"
        );
        Ok(model)
    }

    pub fn from_var_builder(
        vb: VarBuilder<'static>,
        labels: Vec<String>,
        architecture: ResNetArchitecture,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(TomodachiError::config("Image model needs at least one label"));
        }
        let device = vb.device().clone();
        let nclasses = labels.len();
        let model = match architecture {
            ResNetArchitecture::Resnet18 => resnet::resnet18(nclasses, vb),
            ResNetArchitecture::Resnet34 => resnet::resnet34(nclasses, vb),
            ResNetArchitecture::Resnet50 => resnet::resnet50(nclasses, vb),
        }
        .map_err(model_error)?;
        Ok(Self {
            model,
            labels,
            device,
        })
    }

    fn logits(&self, image: &RgbImage) -> candle_core::Result<Vec<f32>> {
        let input = normalized_tensor(image, &self.device)?.unsqueeze(0)?;
        self.model.forward(&input)?.squeeze(0)?.to_vec1::<f32>()
    }
}

impl LogitsModel for ResNetModel {
    fn input_size(&self) -> (u32, u32) {
        (INPUT_SIZE, INPUT_SIZE)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn forward(&self, image: &RgbImage) -> Result<Vec<f32>> {
        self.logits(image).map_err(model_error)
    }
}

/// Reads one class name per line, skipping blank lines.
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TomodachiError::io(format!("Failed to read {}: {e}", path.display())))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// HWC bytes to a normalized CHW float tensor.
fn normalized_tensor(image: &RgbImage, device: &Device) -> candle_core::Result<Tensor> {
    let (width, height) = image.dimensions();
    let pixels = Tensor::from_vec(
        image.as_raw().clone(),
        (height as usize, width as usize, 3),
        device,
    )?
    .permute((2, 0, 1))?
    .to_dtype(DType::F32)?;
    let mean = Tensor::new(&IMAGENET_MEAN, device)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&IMAGENET_STD, device)?.reshape((3, 1, 1))?;
    (pixels / 255.0)?.broadcast_sub(&mean)?.broadcast_div(&std)
}

fn model_error(e: candle_core::Error) -> TomodachiError {
    TomodachiError::image(format!("Image model failed: {e}"))
}
