//! Session credential sources
//!
//! The socket and the REST client read the token each time they need it, so
//! logging in or out (writing or removing the token) takes effect on the
//! next connect without restarting anything.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

pub trait CredentialSource: Send + Sync {
    /// Current session token, if any
    fn token(&self) -> Option<String>;
}

/// Token persisted in a local file
#[derive(Debug, Clone)]
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for FileCredential {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to read session token");
                }
                None
            }
        }
    }
}

/// In-memory token that can be swapped at runtime
#[derive(Debug, Default)]
pub struct StaticCredential {
    token: RwLock<Option<String>>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

impl CredentialSource for StaticCredential {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_credential_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  secret-token  ").unwrap();

        let source = FileCredential::new(file.path());
        assert_eq!(source.token().as_deref(), Some("secret-token"));
    }

    #[test]
    fn test_missing_file_is_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCredential::new(dir.path().join("token"));
        assert_eq!(source.token(), None);
    }

    #[test]
    fn test_empty_file_is_no_credential() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = FileCredential::new(file.path());
        assert_eq!(source.token(), None);
    }

    #[test]
    fn test_static_credential_swap() {
        let source = StaticCredential::new(None);
        assert_eq!(source.token(), None);
        source.set(Some("t".to_string()));
        assert_eq!(source.token().as_deref(), Some("t"));
    }
}
