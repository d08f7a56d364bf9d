//! Rewrite service configuration and the inline-surface preference.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key for the inline surface flag (synced storage).
pub const INLINE_ENABLED_KEY: &str = "inlineBubbleEnabled";
/// Storage key for a runtime API key override (local storage).
pub const API_KEY_OVERRIDE_KEY: &str = "geminiApiKey";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Settings for the rewrite client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteConfig {
    /// API key. `None` makes every rewrite fail with a missing-key error.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Base URL of the generative language API.
    pub base_url: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl RewriteConfig {
    /// Set the API key, treating blank keys as absent.
    pub fn with_api_key(mut self, key: Option<&str>) -> Self {
        self.api_key = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned);
        self
    }

    /// Replace the key with a stored override when one is present.
    pub fn apply_overrides(mut self, stored: &Value) -> Self {
        if let Some(key) = stored
            .get(API_KEY_OVERRIDE_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            self.api_key = Some(key.to_owned());
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// User preferences persisted in synced storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub inline_bubble_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            inline_bubble_enabled: true,
        }
    }
}

impl Preferences {
    /// Read from a storage `get` result. Anything but an explicit `false`
    /// counts as enabled.
    pub fn from_storage(items: &Value) -> Self {
        Self {
            inline_bubble_enabled: items.get(INLINE_ENABLED_KEY) != Some(&Value::Bool(false)),
        }
    }

    /// Read from a storage `onChanged` payload. `None` when the change does
    /// not touch the preference.
    pub fn from_change(changes: &Value) -> Option<Self> {
        let change = changes.get(INLINE_ENABLED_KEY)?;
        Some(Self {
            inline_bubble_enabled: change.get("newValue") != Some(&Value::Bool(false)),
        })
    }

    /// Object to hand to a storage `set` call.
    pub fn to_storage(&self) -> Value {
        let mut items = serde_json::Map::new();
        items.insert(
            INLINE_ENABLED_KEY.to_owned(),
            Value::Bool(self.inline_bubble_enabled),
        );
        Value::Object(items)
    }
}

/// Failure to read or write persisted preferences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("preference storage failed: {0}")]
pub struct StoreError(pub String);

/// Persistence for [`Preferences`].
pub trait PreferenceStore {
    fn load(&self) -> impl Future<Output = Result<Preferences, StoreError>>;

    fn save(&self, prefs: &Preferences) -> impl Future<Output = Result<(), StoreError>>;
}
