// Credential storage backends

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::types::Credentials;

/// Async key-value store holding the active credential pair
///
/// Reads never fail: a store that cannot be read behaves as an empty store,
/// so the gateway simply sends the request unauthenticated.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current access token, if any
    async fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any
    async fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens
    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()>;

    /// Remove both tokens; clearing an empty store succeeds
    async fn clear(&self) -> Result<()>;
}

/// Process-local store, used by tests and short-lived tools
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a credential pair
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            credentials: RwLock::new(Some(Credentials::new(access_token, refresh_token))),
        }
    }

    /// Snapshot of the stored pair
    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Option<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
            .filter(|t| !t.is_empty())
    }

    async fn refresh_token(&self) -> Option<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.refresh_token.clone())
            .filter(|t| !t.is_empty())
    }

    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let mut credentials = self.credentials.write().await;
        *credentials = Some(Credentials::new(access_token, refresh_token));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut credentials = self.credentials.write().await;
        *credentials = None;
        Ok(())
    }
}

/// Store persisting the credential pair as a small JSON document
///
/// Layout: `{"auth_access_token": "...", "auth_refresh_token": "..."}`.
/// A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("servease")
            .join("credentials.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Option<Credentials>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read credential file: {}", self.path.display())
                })
            }
        };

        let credentials: Credentials = serde_json::from_str(&raw).with_context(|| {
            format!("Failed to parse credential file: {}", self.path.display())
        })?;
        Ok(Some(credentials))
    }

    /// Read the stored pair, treating unreadable files as empty
    async fn load_or_empty(&self) -> Option<Credentials> {
        match self.load().await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(error = %e, "Credential store unreadable, continuing unauthenticated");
                None
            }
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> Option<String> {
        self.load_or_empty()
            .await
            .map(|c| c.access_token)
            .filter(|t| !t.is_empty())
    }

    async fn refresh_token(&self) -> Option<String> {
        self.load_or_empty()
            .await
            .map(|c| c.refresh_token)
            .filter(|t| !t.is_empty())
    }

    async fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create credential directory: {}", parent.display())
                })?;
            }
        }

        let body = serde_json::to_vec_pretty(&Credentials::new(access_token, refresh_token))
            .context("Failed to serialize credentials")?;

        // Write next to the target and rename so readers never see a partial file
        let staging = self.path.with_extension("json.tmp");
        write_owner_only(&staging, &body).await?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace credential file: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "Stored credentials");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Cleared credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove credential file: {}", self.path.display())
            }),
        }
    }
}

/// Create `path` readable by the owner only; the mode is set at creation, never after
async fn write_owner_only(path: &Path, body: &[u8]) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    // A leftover staging file may carry looser permissions, start from scratch
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to remove stale staging file: {}", path.display())
            })
        }
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to create credential file: {}", path.display()))?;
    file.write_all(body)
        .await
        .with_context(|| format!("Failed to write credential file: {}", path.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("Failed to flush credential file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemoryCredentialStore::new();
        assert!(store.access_token().await.is_none());

        store.set_tokens("abc", "def").await.unwrap();
        assert_eq!(store.access_token().await.as_deref(), Some("abc"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("def"));

        store.clear().await.unwrap();
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
    }

    #[test]
    fn test_memory_store_clear_twice_is_noop() {
        let store = MemoryCredentialStore::with_tokens("abc", "def");
        tokio_test::block_on(async {
            store.clear().await.unwrap();
            store.clear().await.unwrap();
            assert!(store.credentials().await.is_none());
        });
    }

    #[tokio::test]
    async fn test_memory_store_empty_token_reads_as_none() {
        let store = MemoryCredentialStore::with_tokens("", "");
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("creds.json"));
        assert!(store.access_token().await.is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_persists_under_fixed_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("creds.json");
        let store = FileCredentialStore::new(&path);

        store.set_tokens("abc", "def").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["auth_access_token"], "abc");
        assert_eq!(json["auth_refresh_token"], "def");

        // A fresh handle on the same path sees the same tokens
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.access_token().await.as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert!(reopened.access_token().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        FileCredentialStore::new(&path)
            .set_tokens("abc", "def")
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_replaces_loose_staging_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, "stale").unwrap();
        std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(&path);
        store.set_tokens("abc", "def").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!staging.exists());
        assert_eq!(store.access_token().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.access_token().await.is_none());
    }
}
