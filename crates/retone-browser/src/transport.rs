//! `TabTransport` and `PreferenceStore` over the extension APIs.

use serde_json::Value;

use retone_core::config::{API_KEY_OVERRIDE_KEY, INLINE_ENABLED_KEY};
use retone_core::{
    ChannelError, PreferenceStore, Preferences, Request, RewriteConfig, StoreError, TabTransport,
};

use crate::chrome;

/// Messaging from the popup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTransport;

impl TabTransport for ChromeTransport {
    async fn send_to_active_tab(&self, request: Request) -> Result<Value, ChannelError> {
        let tab_id = chrome::active_tab_id().await?;
        tracing::trace!(target: "retone::transport", tab_id, ?request, "to active tab");
        chrome::send_to_tab(tab_id, &request.to_value()).await
    }

    async fn send_to_runtime(&self, request: Request) -> Result<Value, ChannelError> {
        chrome::send_to_runtime(&request.to_value()).await
    }

    async fn broadcast_to_tabs(&self, request: Request) {
        let ids = match chrome::all_tab_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::debug!(target: "retone::transport", "broadcast skipped: {e}");
                return;
            }
        };
        let message = request.to_value();
        for id in ids {
            chrome::notify_tab(id, &message);
        }
    }
}

/// Preferences in `chrome.storage.sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl PreferenceStore for ChromeStore {
    async fn load(&self) -> Result<Preferences, StoreError> {
        let items = chrome::sync_get(&[INLINE_ENABLED_KEY])
            .await
            .map_err(|e| StoreError(e.0))?;
        Ok(Preferences::from_storage(&items))
    }

    async fn save(&self, prefs: &Preferences) -> Result<(), StoreError> {
        chrome::sync_set(&prefs.to_storage())
            .await
            .map_err(|e| StoreError(e.0))
    }
}

/// Apply the runtime key override from `chrome.storage.local` to `base`.
pub async fn load_rewrite_config(base: RewriteConfig) -> RewriteConfig {
    match chrome::local_get(&[API_KEY_OVERRIDE_KEY]).await {
        Ok(items) => base.apply_overrides(&items),
        Err(e) => {
            tracing::debug!(target: "retone::transport", "no local overrides: {e}");
            base
        }
    }
}
