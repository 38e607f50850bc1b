//! Out-of-process HTML to PDF engines.
//!
//! The default engine is headless Chromium driven by `--print-to-pdf`. Each render
//! spawns one process against a temporary HTML file. The process is owned by an
//! [`EngineProcess`] guard: whether the render succeeds, fails, times out or is
//! cancelled, the process is killed and reaped before the call returns, and the
//! guard's `Drop` kills it if the render future itself is dropped.

use crate::cancel::CancelSignal;
use async_trait::async_trait;
use log::{debug, info, warn};
use rapport_render_core::{RenderError, RenderOptions};
use std::fmt::Debug;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Turns compiled HTML into PDF bytes.
#[async_trait]
pub trait RenderEngine: Send + Sync + Debug {
    async fn render_pdf(
        &self,
        html: &str,
        options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError>;

    /// Returns a human-readable name for this engine (for logging).
    fn name(&self) -> &'static str;
}

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// How to launch the engine process.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub program: String,
    /// Extra arguments. If any contains `{input}` or `{output}`, the placeholders
    /// are substituted and nothing is appended; otherwise Chromium-style
    /// `--print-to-pdf=<output>` and the input file URL are appended.
    pub args: Vec<String>,
    pub timeout: Duration,
    /// How long to wait for the process to exit after it has been killed.
    pub grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "chromium".to_string(),
            args: vec![
                "--headless".to_string(),
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--no-pdf-header-footer".to_string(),
                "--run-all-compositor-stages-before-draw".to_string(),
            ],
            timeout: Duration::from_secs(60),
            grace: Duration::from_secs(2),
        }
    }
}

impl EngineConfig {
    fn command_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let templated = self
            .args
            .iter()
            .any(|a| a.contains(INPUT_PLACEHOLDER) || a.contains(OUTPUT_PLACEHOLDER));
        if templated {
            return self
                .args
                .iter()
                .map(|a| a.replace(INPUT_PLACEHOLDER, &input).replace(OUTPUT_PLACEHOLDER, &output))
                .collect();
        }
        let mut args = self.args.clone();
        args.push(format!("--print-to-pdf={output}"));
        args.push(format!("file://{input}"));
        args
    }
}

/// Owns a running engine process until it has exited.
struct EngineProcess {
    child: Child,
    program: String,
}

impl EngineProcess {
    /// Kills the process and waits up to `grace` for it to be reaped.
    async fn terminate(&mut self, grace: Duration) {
        if let Err(e) = self.child.start_kill() {
            debug!("[ENGINE] kill of '{}' failed (already exited?): {}", self.program, e);
        }
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => debug!("[ENGINE] '{}' stopped: {}", self.program, status),
            Ok(Err(e)) => warn!("[ENGINE] waiting for '{}' failed: {}", self.program, e),
            Err(_) => warn!("[ENGINE] '{}' still running {:?} after kill", self.program, grace),
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            warn!("[ENGINE] '{}' abandoned while running; killing", self.program);
            let _ = self.child.start_kill();
        }
    }
}

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Runs one engine process per render.
#[derive(Debug, Clone, Default)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn stderr_tail(path: &Path) -> String {
    const MAX: usize = 400;
    let text = std::fs::read_to_string(path).unwrap_or_default();
    let text = text.trim();
    match text.char_indices().rev().nth(MAX) {
        Some((cut, _)) => format!("...{}", &text[cut..]),
        None => text.to_string(),
    }
}

#[async_trait]
impl RenderEngine for ProcessEngine {
    async fn render_pdf(
        &self,
        html: &str,
        _options: &RenderOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<u8>, RenderError> {
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("report.html");
        let output = workdir.path().join("report.pdf");
        let log_path = workdir.path().join("engine.log");
        tokio::fs::write(&input, html).await?;
        let log_file = std::fs::File::create(&log_path)?;

        let mut command = Command::new(&self.config.program);
        command
            .args(self.config.command_args(&input, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            RenderError::RenderEngine(format!("failed to launch '{}': {}", self.config.program, e))
        })?;
        let mut process = EngineProcess {
            child,
            program: self.config.program.clone(),
        };
        debug!("[ENGINE] '{}' started (pid {:?})", self.config.program, process.child.id());

        let outcome = tokio::select! {
            status = process.child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep(self.config.timeout) => Outcome::TimedOut,
            _ = cancel.cancelled() => Outcome::Cancelled,
        };

        let status = match outcome {
            Outcome::Exited(status) => status.map_err(|e| {
                RenderError::RenderEngine(format!("lost track of '{}': {}", self.config.program, e))
            })?,
            Outcome::TimedOut => {
                warn!("[ENGINE] '{}' timed out after {:?}", self.config.program, self.config.timeout);
                process.terminate(self.config.grace).await;
                return Err(RenderError::Timeout(self.config.timeout));
            }
            Outcome::Cancelled => {
                info!("[ENGINE] render cancelled; stopping '{}'", self.config.program);
                process.terminate(self.config.grace).await;
                return Err(RenderError::Cancelled);
            }
        };

        if !status.success() {
            return Err(RenderError::RenderEngine(format!(
                "'{}' exited with {}: {}",
                self.config.program,
                status,
                stderr_tail(&log_path)
            )));
        }

        match tokio::fs::read(&output).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RenderError::RenderEngine(
                format!("'{}' exited without writing a PDF", self.config.program),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &'static str {
        "ProcessEngine"
    }
}
