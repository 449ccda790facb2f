//! ONNX image classifier (tract)
//!
//! Runs a ViT-style ImageNet classifier exported to ONNX:
//! - decode → RGB8 → resize 224×224 (bilinear)
//! - rescale 1/255, normalize mean 0.5 / std 0.5 per channel
//! - NCHW tensor `[1, 3, 224, 224]`
//! - forward pass, argmax over logits, index → label table
//!
//! The plan is built once in [`OnnxClassifier::load`] and only read afterwards.

use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

use super::{Classification, ClassifierError, ImageClassifier, LabelTable};

/// Model input edge length
pub const INPUT_SIZE: u32 = 224;

const IMAGE_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const IMAGE_STD: [f32; 3] = [0.5, 0.5, 0.5];

type ClassifierPlan = TypedRunnableModel<TypedModel>;

/// Pretrained classifier loaded from an ONNX file
pub struct OnnxClassifier {
    plan: ClassifierPlan,
    labels: LabelTable,
}

impl OnnxClassifier {
    /// Load and optimize the model, then load its label table
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self, ClassifierError> {
        let size = INPUT_SIZE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                ClassifierError::Model(format!(
                    "Failed to load {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let labels = LabelTable::load(labels_path)?;

        info!(
            model = %model_path.display(),
            classes = labels.len(),
            "Image classifier loaded"
        );

        Ok(Self { plan, labels })
    }

    /// Run one inference, returning the label and its softmax confidence
    fn predict(&self, image_bytes: &[u8]) -> Result<(String, f32), ClassifierError> {
        let image = decode_image(image_bytes)?;
        let input = preprocess(&image);

        let logits: Vec<f32> = {
            let outputs = self
                .plan
                .run(tvec!(input.into()))
                .map_err(|e| ClassifierError::Model(format!("Inference failed: {}", e)))?;
            let first = outputs
                .first()
                .ok_or_else(|| ClassifierError::Model("No output tensors".to_string()))?;
            first
                .to_array_view::<f32>()
                .map_err(|e| ClassifierError::Model(format!("Unexpected output type: {}", e)))?
                .iter()
                .copied()
                .collect()
        };

        let (index, _) = argmax(&logits)
            .ok_or_else(|| ClassifierError::Model("Empty output tensor".to_string()))?;
        let label = self
            .labels
            .get(index)
            .ok_or(ClassifierError::UnknownClass(index))?;

        Ok((label.to_string(), softmax_at(&logits, index)))
    }
}

impl ImageClassifier for OnnxClassifier {
    fn classify(&self, image_bytes: &[u8]) -> Classification {
        match self.predict(image_bytes) {
            Ok((label, confidence)) => {
                debug!(label = %label, confidence, "Image classified");
                Classification::Label(label)
            }
            Err(e) => {
                warn!(error = %e, "Error in animal classification");
                Classification::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Decode any format the `image` crate recognizes
pub fn decode_image(image_bytes: &[u8]) -> Result<DynamicImage, ClassifierError> {
    image::load_from_memory(image_bytes).map_err(|e| ClassifierError::Decode(e.to_string()))
}

/// Build the normalized NCHW input tensor
pub fn preprocess(image: &DynamicImage) -> Tensor {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let size = INPUT_SIZE as usize;

    tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        let value = resized[(x as u32, y as u32)][c] as f32 / 255.0;
        (value - IMAGE_MEAN[c]) / IMAGE_STD[c]
    })
    .into()
}

/// Index and value of the largest logit; NaNs never win
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

/// Softmax probability of one logit
fn softmax_at(logits: &[f32], index: usize) -> f32 {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&x| (x - max).exp()).sum();
    if sum == 0.0 || !sum.is_finite() {
        return 0.0;
    }
    (logits[index] - max).exp() / sum
}
