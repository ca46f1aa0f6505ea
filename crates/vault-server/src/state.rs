use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use vault_core::Vault;

use crate::error::AppError;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    /// The store has a single writer; handlers take the lock inside
    /// `spawn_blocking`.
    pub vault: Arc<Mutex<Vault>>,
    /// Session token -> username.
    pub sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    pub fn new(root: PathBuf, vault: Vault) -> Self {
        Self {
            root,
            vault: Arc::new(Mutex::new(vault)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Run `f` against the vault on the blocking pool.
    pub async fn with_vault<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Vault) -> vault_core::Result<T> + Send + 'static,
    {
        let vault = self.vault.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = vault
                .lock()
                .map_err(|_| AppError(anyhow::anyhow!("vault lock poisoned")))?;
            f(&mut guard).map_err(AppError::from)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(result)
    }

    pub async fn start_session(&self, username: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), username.to_string());
        token
    }

    pub async fn session_user(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn end_session(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Point every session of `old` at `new` after a username change.
    pub async fn rename_sessions(&self, old: &str, new: &str) {
        for user in self.sessions.write().await.values_mut() {
            if user == old {
                *user = new.to_string();
            }
        }
    }
}
