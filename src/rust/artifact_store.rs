use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::bundle::{ArtifactBundle, BundleManifest, BUNDLE_MANIFEST};
use crate::pipeline::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Bundle not found: {0}")]
    NotFound(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid bundle: {0}")]
    BundleError(#[from] PipelineError),
    #[error("Unsafe path in bundle manifest: {0}")]
    UnsafePath(String),
    #[error("Bundle verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// Where a published bundle can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSource {
    pub name: String,
    /// Directory URL; `bundle.json` and the files it lists are fetched relative to it.
    pub base_url: String,
    /// Expected SHA-256 of `bundle.json`, when published alongside the URL.
    pub manifest_hash: Option<String>,
}

/// Local cache of artifact bundles, one directory per bundle name.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    bundles_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn check_relative(file: &str) -> Result<(), StoreError> {
    let path = Path::new(file);
    let safe = !file.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Ok(())
    } else {
        Err(StoreError::UnsafePath(file.to_string()))
    }
}

impl ArtifactStore {
    /// Creates a new ArtifactStore with the default bundles directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_bundles_dir())
    }

    /// Returns the default bundles directory path
    pub fn get_default_bundles_dir() -> PathBuf {
        if let Ok(path) = env::var("FINECAST_HOME") {
            return PathBuf::from(path).join("bundles");
        }
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("finecast").join("bundles");
        }
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("finecast").join("bundles");
        }
        env::temp_dir().join("finecast").join("bundles")
    }

    pub fn new<P: AsRef<Path>>(bundles_dir: P) -> io::Result<Self> {
        let bundles_dir = bundles_dir.as_ref().to_path_buf();
        fs::create_dir_all(&bundles_dir)?;
        Ok(Self {
            bundles_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn bundles_dir(&self) -> &Path {
        &self.bundles_dir
    }

    /// Directory of the named bundle inside the store.
    ///
    /// # Errors
    /// - `UnsafePath` if `name` is empty or would resolve outside the store
    pub fn bundle_dir(&self, name: &str) -> Result<PathBuf, StoreError> {
        check_relative(name)?;
        Ok(self.bundles_dir.join(name))
    }

    pub fn manifest_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.bundle_dir(name)?.join(BUNDLE_MANIFEST))
    }

    /// Whether the named bundle has a manifest. Unsafe names are never present.
    pub fn is_bundle_present(&self, name: &str) -> bool {
        match self.manifest_path(name) {
            Ok(manifest_path) => {
                log::debug!("Manifest path: {:?} (exists: {})", manifest_path, manifest_path.exists());
                manifest_path.exists()
            }
            Err(e) => {
                log::warn!("Rejected bundle name {:?}: {}", name, e);
                false
            }
        }
    }

    fn read_manifest(&self, name: &str) -> Result<BundleManifest, StoreError> {
        if !self.is_bundle_present(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(BundleManifest::from_file(self.manifest_path(name)?)?)
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, StoreError> {
        if !path.exists() {
            log::info!("File {:?} does not exist", path);
            return Ok(false);
        }
        let hash = sha256_hex(&fs::read(path)?);
        log::debug!("{:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    /// Checks every file listed in the manifest's checksums against its SHA-256.
    ///
    /// Returns `Ok(false)` when the bundle is absent or any file is missing or altered.
    ///
    /// # Errors
    /// - `UnsafePath` if `name` or a listed file would resolve outside the bundle
    pub fn verify_bundle(&self, name: &str) -> Result<bool, StoreError> {
        check_relative(name)?;
        if !self.is_bundle_present(name) {
            log::info!("Bundle '{}' is not present", name);
            return Ok(false);
        }
        let manifest = self.read_manifest(name)?;
        let dir = self.bundle_dir(name)?;

        for (file, expected) in &manifest.checksums {
            check_relative(file)?;
            if !self.verify_file(&dir.join(file), expected)? {
                log::warn!("Bundle '{}': {} failed verification", name, file);
                return Ok(false);
            }
        }
        log::info!("Bundle '{}' verified ({} files)", name, manifest.checksums.len());
        Ok(true)
    }

    /// Loads a stored bundle after verifying it.
    pub fn load_bundle(&self, name: &str) -> Result<ArtifactBundle, StoreError> {
        if !self.verify_bundle(name)? {
            return Err(if self.is_bundle_present(name) {
                StoreError::VerificationFailed
            } else {
                StoreError::NotFound(name.to_string())
            });
        }
        Ok(ArtifactBundle::from_dir(self.bundle_dir(name)?)?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        log::info!("Downloading {}", url);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    fn check_hash(file: &str, bytes: &[u8], expected: &str) -> Result<(), StoreError> {
        let actual = sha256_hex(bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            log::error!("{} hash mismatch: expected {}, got {}", file, expected, actual);
            return Err(StoreError::HashMismatch {
                file: file.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Downloads a bundle: the manifest first, then every file it lists, each hash-checked.
    ///
    /// Concurrent fetches through clones of the same store are serialised. On
    /// failure the partially written bundle is removed.
    pub async fn fetch_bundle(&self, source: &BundleSource) -> Result<(), StoreError> {
        let _lock = self.download_lock.lock().await;
        self.fetch_or_clean(source).await
    }

    async fn fetch_or_clean(&self, source: &BundleSource) -> Result<(), StoreError> {
        let result = self.fetch_unlocked(source).await;
        if let Err(e) = &result {
            log::error!("Failed to fetch bundle '{}': {}", source.name, e);
            let _ = self.remove_bundle(&source.name);
        }
        result
    }

    async fn fetch_unlocked(&self, source: &BundleSource) -> Result<(), StoreError> {
        let dir = self.bundle_dir(&source.name)?;
        let base = source.base_url.trim_end_matches('/');

        let manifest_bytes = self.download(&format!("{}/{}", base, BUNDLE_MANIFEST)).await?;
        if let Some(expected) = &source.manifest_hash {
            Self::check_hash(BUNDLE_MANIFEST, &manifest_bytes, expected)?;
        }
        let manifest: BundleManifest = serde_json::from_slice(&manifest_bytes).map_err(PipelineError::from)?;

        fs::create_dir_all(&dir)?;
        for (file, expected) in &manifest.checksums {
            check_relative(file)?;
            let bytes = self.download(&format!("{}/{}", base, file)).await?;
            Self::check_hash(file, &bytes, expected)?;
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, bytes)?;
        }
        // The manifest goes last so a present manifest means a complete bundle.
        fs::write(dir.join(BUNDLE_MANIFEST), &manifest_bytes)?;

        if !self.verify_bundle(&source.name)? {
            return Err(StoreError::VerificationFailed);
        }
        log::info!("Bundle '{}' fetched and verified", source.name);
        Ok(())
    }

    /// Fetches the bundle unless a verified copy is already stored.
    ///
    /// The check, the removal of a stale copy and the download all hold the
    /// download lock.
    pub async fn ensure_bundle(&self, source: &BundleSource) -> Result<(), StoreError> {
        let _lock = self.download_lock.lock().await;
        if self.verify_bundle(&source.name)? {
            log::info!("Bundle '{}' already present", source.name);
            return Ok(());
        }
        self.remove_bundle(&source.name)?;
        self.fetch_or_clean(source).await
    }

    pub fn remove_bundle(&self, name: &str) -> Result<(), StoreError> {
        let dir = self.bundle_dir(name)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
