//! Mock Converter for Testing
//!
//! Records every conversion request and writes a stub output file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use vrtools::error::{VrError, VrResult};
use vrtools::tools::{AssetConverter, ProgressReporter};

/// Mock converter that records `(input, output)` pairs
#[derive(Debug)]
pub struct MockConverter {
    pub calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
    /// Progress steps reported before finishing
    pub steps: u64,
    /// Exit status to fail with, if any
    pub fail_with: Option<i32>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            steps: 4,
            fail_with: None,
        }
    }

    pub fn failing(status: i32) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new()
        }
    }

    pub fn get_calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetConverter for MockConverter {
    async fn convert(&self, input: &Path, output: &Path, progress: ProgressReporter) -> VrResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));

        for step in 1..self.steps {
            progress.report(step, self.steps);
        }

        if let Some(status) = self.fail_with {
            return Err(VrError::Conversion {
                status,
                message: "mock conversion failure".to_string(),
            });
        }

        std::fs::write(output, "#usda 1.0\n")?;
        progress.report(self.steps, self.steps);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
