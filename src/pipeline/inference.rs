//! Model loading and invocation.
//!
//! Models are ONNX graphs run with tract. The loaded plan is immutable and
//! `run` takes `&self`, so one handle serves every request concurrently.

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tract_onnx::tract_core::ndarray::{ArrayViewD, Axis};

use super::tensor::{CHANNELS, ImageTensor};
use crate::error::{ClassifyError, Result};

/// A loaded, read-only classification model
pub trait Model: Send + Sync {
    /// Run one `[1, H, W, 3]` tensor and return the first output row
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>>;

    /// Number of classes, when the graph declares it statically
    fn output_len(&self) -> Option<usize> {
        None
    }
}

/// Where and how to load a model
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub dir: PathBuf,
    pub file: String,
    pub input_name: Option<String>,
    pub output_name: Option<String>,
    pub height: u32,
    pub width: u32,
}

impl ModelSpec {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

pub struct TractModel {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    path: PathBuf,
}

impl TractModel {
    pub fn load(spec: &ModelSpec) -> Result<Self> {
        let path = spec.path();
        let load_err = |reason: String| ClassifyError::ModelLoad {
            path: path.clone(),
            reason,
        };

        if !spec.dir.is_dir() {
            return Err(load_err("model directory does not exist".into()));
        }

        log::info!("[model] Loading {:?}", path);

        let plan = Self::build_plan(&path, spec).map_err(|e| load_err(format!("{:#}", e)))?;

        log::info!("[model] Loaded {:?}", path);
        Ok(Self { plan, path })
    }

    fn build_plan(
        path: &Path,
        spec: &ModelSpec,
    ) -> TractResult<SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>> {
        let mut model = tract_onnx::onnx().model_for_path(path)?;

        if let Some(name) = &spec.input_name {
            model = model.with_input_names([name.as_str()])?;
        }
        if let Some(name) = &spec.output_name {
            model = model.with_output_names([name.as_str()])?;
        }

        model
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    [1, spec.height as usize, spec.width as usize, CHANNELS],
                ),
            )?
            .into_optimized()?
            .into_runnable()
    }
}

impl Model for TractModel {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let tensor = Tensor::from_shape::<f32>(&input.shape(), input.as_slice())
            .map_err(|e| ClassifyError::Inference(format!("{:#}", e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into_tvalue()))
            .map_err(|e| ClassifyError::Inference(format!("{:?}: {:#}", self.path, e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassifyError::Inference("model produced no outputs".into()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("{:#}", e)))?;

        first_row(view)
    }

    fn output_len(&self) -> Option<usize> {
        let fact = self.plan.model().output_fact(0).ok()?;
        fact.shape.as_concrete()?.last().copied()
    }
}

/// Row 0 of a `[1, numClasses]` output
fn first_row(view: ArrayViewD<'_, f32>) -> Result<Vec<f32>> {
    if view.ndim() != 2 || view.shape()[0] == 0 {
        return Err(ClassifyError::Inference(format!(
            "expected output shape [1, classes], got {:?}",
            view.shape()
        )));
    }

    Ok(view.index_axis(Axis(0), 0).iter().copied().collect())
}
