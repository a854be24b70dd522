//! Wrapper around the Godot script that turns a PNG into the game's
//! encrypted cache format.

use std::path::{Path, PathBuf};

use tokio::process::Command;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Godot binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("encode script not found at {0}")]
    MissingScript(PathBuf),
    #[error("could not start encoder: {0}")]
    Spawn(String),
    #[error("encoder failed: {0}")]
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoder {
    pub godot_bin: PathBuf,
    pub script: PathBuf,
}

impl Encoder {
    pub fn new(godot_bin: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            godot_bin: godot_bin.into(),
            script: script.into(),
        }
    }

    pub fn check(&self) -> Result<(), EncodeError> {
        if !self.godot_bin.is_file() {
            return Err(EncodeError::MissingBinary(self.godot_bin.clone()));
        }
        if !self.script.is_file() {
            return Err(EncodeError::MissingScript(self.script.clone()));
        }
        Ok(())
    }

    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.godot_bin);
        command
            .arg("--headless")
            .arg("--script")
            .arg(&self.script)
            .arg("--")
            .arg(input)
            .arg(output)
            .kill_on_drop(true);
        command
    }

    /// Encodes `input` into `output` and returns the encoded bytes.
    pub async fn encode(&self, input: &Path, output: &Path) -> Result<Vec<u8>, EncodeError> {
        self.check()?;
        tracing::info!(input = %input.display(), output = %output.display(), "encoding");
        let result = self
            .command(input, output)
            .output()
            .await
            .map_err(|err| EncodeError::Spawn(err.to_string()))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                format!("exit status {}", result.status)
            } else {
                stderr
            };
            return Err(EncodeError::Failed(detail));
        }
        tokio::fs::read(output)
            .await
            .map_err(|_| EncodeError::Failed("no output file produced".to_string()))
    }
}
