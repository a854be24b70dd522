use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::catalog::{self, BossEntry, CatalogEntry};
use crate::config::{CANVAS_SIZE, FETCH_TIMEOUT, SPRITE_FETCH_CONCURRENCY};
use crate::moves::export;
use crate::moves::{DataSource, Dataset, LoadError};
use crate::sprite::{self, SpriteInfo};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSource {
    /// Local game cache, then remote.
    Auto,
    Local,
    Upload(String),
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLocations {
    pub local: Option<PathBuf>,
    pub url: String,
}

pub async fn load_dataset(
    source: &LoadSource,
    locations: &DatasetLocations,
) -> Result<(Dataset, DataSource), LoadError> {
    let result = match source {
        LoadSource::Local => read_local(locations.local.as_deref())
            .await
            .map(|dataset| (dataset, DataSource::Local)),
        LoadSource::Upload(path) => read_upload(Path::new(path))
            .await
            .map(|dataset| (dataset, DataSource::Upload(path.clone()))),
        LoadSource::Remote => fetch_remote(&locations.url)
            .await
            .map(|dataset| (dataset, DataSource::Remote)),
        LoadSource::Auto => match read_local(locations.local.as_deref()).await {
            Ok(dataset) => Ok((dataset, DataSource::Local)),
            Err(err) => {
                tracing::info!(%err, "local dataset unavailable, using remote");
                fetch_remote(&locations.url)
                    .await
                    .map(|dataset| (dataset, DataSource::Remote))
            }
        },
    };
    match &result {
        Ok((dataset, source)) => {
            tracing::info!(%source, creatures = dataset.len(), "dataset loaded")
        }
        Err(err) => tracing::warn!(?source, %err, "dataset load failed"),
    }
    result
}

// A corrupt game cache is treated like a missing one.
async fn read_local(path: Option<&Path>) -> Result<Dataset, LoadError> {
    let path = path.ok_or_else(|| LoadError::NotAvailable("no local data directory".into()))?;
    let bytes = fs::read(path)
        .await
        .map_err(|err| LoadError::NotAvailable(format!("{}: {err}", path.display())))?;
    export::parse(&bytes).map_err(|err| LoadError::NotAvailable(format!("{}: {err}", path.display())))
}

async fn read_upload(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = fs::read(path)
        .await
        .map_err(|err| LoadError::NotAvailable(format!("{}: {err}", path.display())))?;
    export::parse(&bytes)
}

async fn fetch_remote(url: &str) -> Result<Dataset, LoadError> {
    let bytes = fetch_bytes(url).await.map_err(LoadError::NotAvailable)?;
    export::parse(&bytes)
}

pub async fn load_catalog(url: &str) -> Result<Vec<CatalogEntry>, String> {
    let dataset = fetch_remote(url).await.map_err(|err| err.to_string())?;
    Ok(catalog::expand_stages(&dataset))
}

pub async fn load_bosses(path: &Path) -> Result<Vec<BossEntry>, String> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(format!("{}: {err}", path.display())),
    };
    serde_json::from_slice(&bytes).map_err(|err| format!("{}: {err}", path.display()))
}

/// Looks up sprite sizes for a page of URLs concurrently. Failed fetches
/// come back without a size.
pub async fn fetch_sprite_infos(urls: &[String]) -> Vec<SpriteInfo> {
    let semaphore = Arc::new(Semaphore::new(SPRITE_FETCH_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for url in urls {
        let url = url.clone();
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let size = match semaphore.acquire_owned().await {
                Ok(_permit) => match fetch_bytes(&url).await {
                    Ok(bytes) => sprite::image_size(&bytes).ok(),
                    Err(err) => {
                        tracing::debug!(%url, %err, "sprite fetch failed");
                        None
                    }
                },
                Err(_) => None,
            };
            SpriteInfo::new(url, size)
        });
    }

    let mut infos = Vec::with_capacity(urls.len());
    while let Some(result) = join_set.join_next().await {
        if let Ok(info) = result {
            infos.push(info);
        }
    }
    infos
}

/// Size of the sprite being replaced, or the default canvas when the CDN
/// has nothing usable.
pub async fn fetch_original_size(url: &str) -> (u32, u32) {
    match fetch_bytes(url).await {
        Ok(bytes) => sprite::image_size(&bytes).unwrap_or(CANVAS_SIZE),
        Err(_) => CANVAS_SIZE,
    }
}

pub async fn write_export(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, String> {
    fs::create_dir_all(dir)
        .await
        .map_err(|err| format!("{}: {err}", dir.display()))?;
    let path = dir.join(filename);
    fs::write(&path, bytes)
        .await
        .map_err(|err| format!("{}: {err}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(path)
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let response = response.error_for_status().map_err(|err| err.to_string())?;
    Ok(response
        .bytes()
        .await
        .map_err(|err| err.to_string())?
        .to_vec())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"[{"id":1,"names":["Flue"],"abilities":[]}]"#;

    fn locations(local: Option<PathBuf>) -> DatasetLocations {
        DatasetLocations {
            local,
            url: "http://127.0.0.1:9/miscrits.json".to_string(),
        }
    }

    #[tokio::test]
    async fn local_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miscrits.json");
        std::fs::write(&path, DATA).unwrap();
        let (dataset, source) = load_dataset(&LoadSource::Local, &locations(Some(path)))
            .await
            .unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(source, DataSource::Local);
    }

    #[tokio::test]
    async fn missing_or_corrupt_local_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miscrits.json");
        let err = load_dataset(&LoadSource::Local, &locations(Some(path.clone())))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::NotAvailable(_)));
        std::fs::write(&path, "{oops").unwrap();
        let err = load_dataset(&LoadSource::Local, &locations(Some(path)))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::NotAvailable(_)));
    }

    #[tokio::test]
    async fn bad_upload_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.json");
        std::fs::write(&path, [0xff, 0x00, 0xfe]).unwrap();
        let source = LoadSource::Upload(path.display().to_string());
        let err = load_dataset(&source, &locations(None)).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn upload_records_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.json");
        std::fs::write(&path, DATA).unwrap();
        let name = path.display().to_string();
        let (_, source) = load_dataset(&LoadSource::Upload(name.clone()), &locations(None))
            .await
            .unwrap();
        assert_eq!(source, DataSource::Upload(name));
    }

    #[tokio::test]
    async fn missing_boss_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let bosses = load_bosses(&dir.path().join("bosses.json")).await.unwrap();
        assert!(bosses.is_empty());
    }

    #[tokio::test]
    async fn boss_catalog_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bosses.json");
        std::fs::write(&path, r#"[{"id":7,"first_name":"Magicite","rarity":"Global Boss"}]"#)
            .unwrap();
        let bosses = load_bosses(&path).await.unwrap();
        assert_eq!(bosses[0].first_name, "Magicite");
        assert_eq!(bosses[0].element, "None");
    }

    #[tokio::test]
    async fn export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let path = write_export(&target, "miscrits_20240101.json", b"[]").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"[]");
    }
}
