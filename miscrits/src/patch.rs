//! Upload -> resize -> encode -> export for one sprite or avatar.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api;
use crate::config::AVATAR_SIZE;
use crate::encoder::{EncodeError, Encoder};
use crate::sprite::{self, EditMode, ResizePlan, SpriteError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("could not read upload {path}: {reason}")]
    Upload { path: String, reason: String },
    #[error(transparent)]
    Sprite(#[from] SpriteError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("could not write {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Everything that decides the encoded bytes. Equal keys reuse the last
/// encode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchKey {
    pub name: String,
    pub mode: EditMode,
    pub plan: ResizePlan,
    pub upload_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRequest {
    /// Stage or boss name the CDN files are keyed by.
    pub name: String,
    pub mode: EditMode,
    pub upload_path: String,
    pub plan: ResizePlan,
    pub workdir: PathBuf,
    pub export_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub key: PatchKey,
    pub cache_name: String,
    pub original_size: (u32, u32),
    pub target_size: (u32, u32),
    pub resized_path: PathBuf,
    pub exported_path: PathBuf,
    pub encoded_len: usize,
    pub reused: bool,
}

pub fn resized_filename(name: &str, mode: EditMode) -> String {
    format!("{}_{}.resized.png", name.replace(' ', "_"), mode.file_part())
}

pub async fn run(
    request: PatchRequest,
    encoder: &Encoder,
    previous: Option<&PatchOutcome>,
) -> Result<PatchOutcome, PatchError> {
    let upload = tokio::fs::read(&request.upload_path)
        .await
        .map_err(|err| PatchError::Upload {
            path: request.upload_path.clone(),
            reason: err.to_string(),
        })?;
    let url = request.mode.cdn_url(&request.name);
    let cache_name = sprite::cache_filename(&url);
    let key = PatchKey {
        name: request.name.clone(),
        mode: request.mode,
        plan: request.plan,
        upload_hash: sprite::content_hash(&upload),
    };

    if let Some(previous) = previous {
        if previous.key == key && previous.exported_path.is_file() {
            tracing::info!(name = %key.name, "upload unchanged, reusing encode");
            return Ok(PatchOutcome {
                reused: true,
                ..previous.clone()
            });
        }
    }

    let original_size = match request.mode {
        EditMode::Avatar => AVATAR_SIZE,
        EditMode::Sprite => api::fetch_original_size(&url).await,
    };

    let resized_path = request
        .workdir
        .join(resized_filename(&request.name, request.mode));
    let target_size = resize_to_file(
        upload,
        request.mode,
        request.plan,
        original_size,
        resized_path.clone(),
    )
    .await?;

    let encoded_path = request.workdir.join(&cache_name);
    let encoded = encoder.encode(&resized_path, &encoded_path).await?;

    let exported_path = write_file(&request.export_dir, &cache_name, &encoded).await?;
    tracing::info!(
        name = %key.name,
        mode = request.mode.label(),
        path = %exported_path.display(),
        "patch exported"
    );

    Ok(PatchOutcome {
        key,
        cache_name,
        original_size,
        target_size,
        resized_path,
        exported_path,
        encoded_len: encoded.len(),
        reused: false,
    })
}

async fn resize_to_file(
    upload: Vec<u8>,
    mode: EditMode,
    plan: ResizePlan,
    original: (u32, u32),
    path: PathBuf,
) -> Result<(u32, u32), PatchError> {
    let joined = tokio::task::spawn_blocking(move || {
        let resized = sprite::resize_upload(&upload, mode, plan, original)?;
        resized
            .save(&path)
            .map_err(|err| SpriteError::Write(format!("{}: {err}", path.display())))?;
        Ok::<_, SpriteError>(resized.dimensions())
    })
    .await
    .map_err(|err| PatchError::Sprite(SpriteError::Write(err.to_string())))?;
    Ok(joined?)
}

async fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, PatchError> {
    let to_error = |path: &Path, err: std::io::Error| PatchError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| to_error(dir, err))?;
    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|err| to_error(&path, err))?;
    Ok(path)
}
