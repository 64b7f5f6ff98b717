//! USD Converter
//!
//! Converts `.fbx` files to the native scene format in a background task.
//! Progress is published on a `watch` channel; dropping the handle stops
//! listening but lets the conversion finish.

use crate::error::{VrError, VrResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Progress bar state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvertProgress {
    /// 0.0 - 1.0
    pub fraction: f64,
    /// A conversion is running; the convert button stays disabled
    pub busy: bool,
}

/// Turns `(current, total)` callbacks into [`ConvertProgress`] updates
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<ConvertProgress>>,
}

impl ProgressReporter {
    pub fn channel() -> (Self, watch::Receiver<ConvertProgress>) {
        let (tx, rx) = watch::channel(ConvertProgress::default());
        (Self { tx: Arc::new(tx) }, rx)
    }

    fn begin(&self) {
        self.tx.send_replace(ConvertProgress {
            fraction: 0.0,
            busy: true,
        });
    }

    /// Report `current` of `total` steps done. Completion resets the bar.
    pub fn report(&self, current: u64, total: u64) {
        if total == 0 {
            return;
        }
        let fraction = (current as f64 / total as f64).min(1.0);
        if fraction >= 1.0 {
            self.finish();
        } else {
            self.tx.send_replace(ConvertProgress {
                fraction,
                busy: true,
            });
        }
    }

    fn finish(&self) {
        self.tx.send_replace(ConvertProgress::default());
    }
}

/// Trait for asset conversion backends
#[async_trait]
pub trait AssetConverter: Send + Sync + std::fmt::Debug {
    /// Convert `input` into `output`, reporting progress along the way
    async fn convert(&self, input: &Path, output: &Path, progress: ProgressReporter) -> VrResult<()>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Runs an external converter as `program [args..] <input> <output>`.
///
/// Stdout lines of the form `current/total` (optionally prefixed with
/// `progress`) are reported as progress.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
}

impl ExternalConverter {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

/// Parse a `current/total` progress line
pub fn parse_progress(line: &str) -> Option<(u64, u64)> {
    let mut text = line.trim();
    if let Some(rest) = text
        .get(..8)
        .filter(|prefix| prefix.eq_ignore_ascii_case("progress"))
        .and_then(|_| text.get(8..))
    {
        text = rest.trim_start_matches(':').trim();
    }
    let (current, total) = text.split_once('/')?;
    Some((current.trim().parse().ok()?, total.trim().parse().ok()?))
}

#[async_trait]
impl AssetConverter for ExternalConverter {
    async fn convert(&self, input: &Path, output: &Path, progress: ProgressReporter) -> VrResult<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VrError::Conversion {
                status: -1,
                message: format!("failed to start {}: {}", self.program, e),
            })?;

        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf).await;
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        // Converter output is not guaranteed to be UTF-8
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        match parse_progress(&line) {
                            Some((current, total)) => progress.report(current, total),
                            None => debug!("{}: {}", self.program, line.trim_end()),
                        }
                    }
                    Err(e) => {
                        warn!("Stopped reading {} output: {}", self.program, e);
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        let message = stderr_task.await.unwrap_or_default();
        if status.success() {
            Ok(())
        } else {
            Err(VrError::Conversion {
                status: status.code().unwrap_or(-1),
                message: message.trim().to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// A running conversion
#[derive(Debug)]
pub struct ConversionHandle {
    output: PathBuf,
    progress: watch::Receiver<ConvertProgress>,
    task: JoinHandle<VrResult<()>>,
}

impl ConversionHandle {
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Latest progress
    pub fn progress(&self) -> ConvertProgress {
        *self.progress.borrow()
    }

    /// A receiver for following progress updates
    pub fn subscribe(&self) -> watch::Receiver<ConvertProgress> {
        self.progress.clone()
    }

    /// Wait for the conversion and return the output path
    pub async fn wait(self) -> VrResult<PathBuf> {
        self.task
            .await
            .map_err(|e| VrError::Other(e.into()))??;
        Ok(self.output)
    }
}

/// The converter panel
#[derive(Debug, Clone)]
pub struct UsdConverter {
    converter: Arc<dyn AssetConverter>,
    output_extension: String,
}

impl UsdConverter {
    pub fn new(converter: Arc<dyn AssetConverter>, output_extension: &str) -> Self {
        Self {
            converter,
            output_extension: output_extension.to_string(),
        }
    }

    /// Clean up a user-entered path: strip quotes, require an existing
    /// `.fbx` file.
    pub fn valid_source(raw: &str) -> Option<PathBuf> {
        let path = PathBuf::from(raw.trim().trim_matches('"'));
        let is_fbx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("fbx"));
        (is_fbx && path.is_file()).then_some(path)
    }

    /// Output next to the source with the native extension
    pub fn output_path(&self, source: &Path) -> PathBuf {
        source.with_extension(&self.output_extension)
    }

    /// Start converting `raw` in the background. Must be called from within
    /// a tokio runtime.
    pub fn start(&self, raw: &str) -> VrResult<ConversionHandle> {
        let source =
            Self::valid_source(raw).ok_or_else(|| VrError::InvalidSource(raw.to_string()))?;
        let output = self.output_path(&source);

        if output.is_file() {
            debug!("Removing old output {:?}", output);
            std::fs::remove_file(&output)?;
        }

        let (reporter, progress) = ProgressReporter::channel();
        reporter.begin();

        info!(
            "🔄 Converting {:?} -> {:?} ({})",
            source,
            output,
            self.converter.name()
        );

        let converter = self.converter.clone();
        let task_output = output.clone();
        let task = tokio::spawn(async move {
            let result = converter
                .convert(&source, &task_output, reporter.clone())
                .await;
            reporter.finish();
            match &result {
                Ok(()) => info!("✅ Converted {:?}", task_output),
                Err(e) => warn!("❌ Conversion of {:?} failed: {}", source, e),
            }
            result
        });

        Ok(ConversionHandle {
            output,
            progress,
            task,
        })
    }
}
