//! Credential resolution for the binaries.
//!
//! Connectors never look at the process environment themselves; the MCP
//! server and the CLI call [`resolve_auth`] once at startup and hand the
//! result to each connector constructor.

use crate::auth::AuthDetails;
use crate::auth_store::AuthStore;

/// `(provider, field, environment variable)` fallbacks.
pub const ENV_FALLBACKS: &[(&str, &str, &str)] = &[
    ("youtube", "api_key", "YOUTUBE_API_KEY"),
    ("transcripts", "language", "YOUTUBE_TRANSCRIPT_LANG"),
];

/// Stored details for `provider`, with missing fields filled from the environment.
pub fn resolve_auth(store: Option<&dyn AuthStore>, provider: &str) -> AuthDetails {
    resolve_auth_with(store, provider, |var| std::env::var(var).ok())
}

pub fn resolve_auth_with<F>(store: Option<&dyn AuthStore>, provider: &str, env: F) -> AuthDetails
where
    F: Fn(&str) -> Option<String>,
{
    let mut details = store.and_then(|s| s.load(provider)).unwrap_or_default();

    for (p, field, var) in ENV_FALLBACKS {
        if *p != provider || details.contains_key(*field) {
            continue;
        }
        if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
            details.insert((*field).to_string(), value);
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_store::MemoryAuthStore;

    #[test]
    fn stored_value_wins_over_environment() {
        let store = MemoryAuthStore::new();
        let mut stored = AuthDetails::new();
        stored.insert("api_key".into(), "from-store".into());
        store.save("youtube", &stored).unwrap();

        let details = resolve_auth_with(Some(&store), "youtube", |_| Some("from-env".into()));
        assert_eq!(details.get("api_key").unwrap(), "from-store");
    }

    #[test]
    fn environment_fills_missing_fields() {
        let details = resolve_auth_with(None, "transcripts", |var| {
            (var == "YOUTUBE_TRANSCRIPT_LANG").then(|| "de".to_string())
        });
        assert_eq!(details.get("language").unwrap(), "de");

        let details = resolve_auth_with(None, "youtube", |_| Some("   ".into()));
        assert!(details.is_empty());
    }
}
