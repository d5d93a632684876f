use crate::error::AuthError;
use std::fs;
use std::path::PathBuf;

/// Persists the backend session cookie between runs.
pub struct CredentialStore {
    cookie_path: PathBuf,
}

impl CredentialStore {
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("banger");
        Self::at(cache_dir.join("session"))
    }

    pub fn at(cookie_path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let cookie_path = cookie_path.into();

        if let Some(parent) = cookie_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AuthError::CredentialStorage(format!("Failed to create cache directory: {}", e))
                })?;
            }
        }

        Ok(Self { cookie_path })
    }

    pub fn save(&self, cookie_header: &str) -> Result<(), AuthError> {
        fs::write(&self.cookie_path, cookie_header)
            .map_err(|e| AuthError::CredentialStorage(format!("Failed to save session: {}", e)))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.cookie_path)
                .map_err(|e| {
                    AuthError::CredentialStorage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.cookie_path, perms).map_err(|e| {
                AuthError::CredentialStorage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        Ok(())
    }

    pub fn load(&self) -> Result<Option<String>, AuthError> {
        if !self.cookie_path.exists() {
            return Ok(None);
        }

        let header = fs::read_to_string(&self.cookie_path)
            .map_err(|e| AuthError::CredentialStorage(format!("Failed to read session: {}", e)))?;
        let header = header.trim();

        Ok((!header.is_empty()).then(|| header.to_string()))
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        if self.cookie_path.exists() {
            fs::remove_file(&self.cookie_path)
                .map_err(|e| AuthError::CredentialStorage(format!("Failed to delete session: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("nested").join("session")).unwrap();

        assert_eq!(store.load().unwrap(), None);

        store.save("banger_session=abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("banger_session=abc"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        let store = CredentialStore::at(&path).unwrap();

        store.save("banger_session=abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
