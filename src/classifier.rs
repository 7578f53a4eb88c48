//! ONNX classifier session wrapper.

use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

static ORT_INIT: OnceLock<()> = OnceLock::new();

fn ensure_ort_init() {
    ORT_INIT.get_or_init(|| {
        let _ = ort::init().commit();
    });
}

/// Binary real-vs-synthetic image classifier backed by an ONNX session.
///
/// Loaded once at startup and shared across requests. `ort` requires `&mut`
/// access to run inference, so calls are serialized behind a mutex; the
/// session itself is stateless between runs.
pub struct Classifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl Classifier {
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ort::Error> {
        ensure_ort_init();
        let session = Session::builder()?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path.as_ref())?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .unwrap_or_else(|| "output".to_string());

        Ok(Classifier {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Run the model over a batch of normalized RGB frames and return the
    /// flattened per-frame scores, each in [0, 1].
    pub fn score(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ort::Error> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let input = TensorRef::from_array_view(batch.view())?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;
        let scores = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;

        Ok(scores.iter().copied().collect())
    }
}
