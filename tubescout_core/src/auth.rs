use std::collections::HashMap;

/// Credentials and per-provider settings, keyed by field name (e.g. `api_key`).
pub type AuthDetails = HashMap<String, String>;
