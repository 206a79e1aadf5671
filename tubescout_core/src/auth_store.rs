use crate::auth::AuthDetails;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("persist error: {0}")]
    Persist(String),
}

pub trait AuthStore: Send + Sync {
    fn load(&self, provider: &str) -> Option<AuthDetails>;
    fn save(&self, provider: &str, auth: &AuthDetails) -> Result<(), StoreError>;
    fn remove(&self, provider: &str) -> Result<(), StoreError>;
    fn list_providers(&self) -> Vec<String>;
}

/// A simple in-memory store, mainly for testing.
pub struct MemoryAuthStore {
    map: std::sync::Mutex<HashMap<String, AuthDetails>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self {
            map: std::sync::Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore for MemoryAuthStore {
    fn load(&self, provider: &str) -> Option<AuthDetails> {
        self.map.lock().ok()?.get(provider).cloned()
    }

    fn save(&self, provider: &str, auth: &AuthDetails) -> Result<(), StoreError> {
        self.map
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .insert(provider.to_string(), auth.clone());
        Ok(())
    }

    fn remove(&self, provider: &str) -> Result<(), StoreError> {
        self.map
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .remove(provider);
        Ok(())
    }

    fn list_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = self
            .map
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        providers.sort();
        providers
    }
}

/// A file-backed JSON store at `~/.config/tubescout/auth.json` (Unix)
/// or `%APPDATA%/tubescout/auth.json` (Windows).
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        let dir = base.join("tubescout");
        std::fs::create_dir_all(&dir).ok();
        Self {
            path: dir.join("auth.json"),
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn config_path(&self) -> String {
        self.path.display().to_string()
    }

    fn read_map(&self) -> HashMap<String, AuthDetails> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, AuthDetails>) -> Result<(), StoreError> {
        let s = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Persist(format!("serde: {}", e)))?;
        std::fs::write(&self.path, &s).map_err(|e| StoreError::Persist(e.to_string()))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| StoreError::Persist(format!("chmod: {}", e)))?;
        }

        Ok(())
    }
}

impl AuthStore for FileAuthStore {
    fn load(&self, provider: &str) -> Option<AuthDetails> {
        self.read_map().get(provider).cloned()
    }

    fn save(&self, provider: &str, auth: &AuthDetails) -> Result<(), StoreError> {
        let mut map = self.read_map();
        map.insert(provider.to_string(), auth.clone());
        self.write_map(&map)
    }

    fn remove(&self, provider: &str) -> Result<(), StoreError> {
        let mut map = self.read_map();
        if map.remove(provider).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn list_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = self.read_map().into_keys().collect();
        providers.sort();
        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_removes() {
        let path = std::env::temp_dir().join(format!(
            "tubescout-auth-{}-{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = FileAuthStore::at_path(&path);

        let mut details = AuthDetails::new();
        details.insert("api_key".into(), "secret".into());
        store.save("youtube", &details).unwrap();

        assert_eq!(store.list_providers(), vec!["youtube".to_string()]);
        assert_eq!(
            store.load("youtube").unwrap().get("api_key").map(String::as_str),
            Some("secret")
        );

        store.remove("youtube").unwrap();
        assert!(store.load("youtube").is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn memory_store_lists_sorted() {
        let store = MemoryAuthStore::new();
        store.save("youtube", &AuthDetails::new()).unwrap();
        store.save("transcripts", &AuthDetails::new()).unwrap();
        assert_eq!(store.list_providers(), vec!["transcripts", "youtube"]);
    }
}
