//! Credential ownership and the session validity window.
//!
//! [`SessionStore`] is the single owner of the credential. Every other
//! component reads it through the store; writes are total replacements
//! published on a `tokio::sync::watch` channel, so a reader observes
//! either the old or the new value atomically, never a mix.
//!
//! Persistence is best-effort: when no storage directory is
//! configured (some execution contexts have no persistent storage),
//! setting a credential silently keeps it in memory only. A genuine
//! write failure on a configured medium is a
//! [`CoreError::Persistence`].

use std::path::{Path, PathBuf};

use tokio::sync::watch;

use pixora_core::claims;
use pixora_core::error::{CoreError, CoreResult};

/// File name for the end-user credential.
pub const USER_TOKEN_FILE: &str = "pixora_access_token";

/// File name reserved for administrative sessions. Admin and end-user
/// credentials are separate trust domains; this store never reads or
/// writes the admin file.
pub const ADMIN_TOKEN_FILE: &str = "pixora_admin_token";

/// Owner of the credential and its validity window.
pub struct SessionStore {
    tx: watch::Sender<Option<String>>,
    token_path: Option<PathBuf>,
}

impl SessionStore {
    /// A store with no persistent medium; credentials live only for
    /// the process lifetime.
    pub fn in_memory() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            token_path: None,
        }
    }

    /// A store persisting the credential under `dir`. Loads a
    /// previously persisted credential if one exists.
    pub fn with_storage_dir(dir: impl AsRef<Path>) -> Self {
        let token_path = dir.as_ref().join(USER_TOKEN_FILE);
        let initial = match std::fs::read_to_string(&token_path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() {
                    None
                } else {
                    Some(token)
                }
            }
            Err(_) => None,
        };

        if initial.is_some() {
            tracing::debug!(path = %token_path.display(), "Loaded persisted credential");
        }

        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            token_path: Some(token_path),
        }
    }

    /// Replace the credential wholesale and persist it.
    ///
    /// With no storage medium configured this is a silent in-memory
    /// update, not a hard failure.
    pub fn set_credential(&self, token: &str) -> CoreResult<()> {
        self.tx.send_replace(Some(token.to_string()));

        if let Some(path) = &self.token_path {
            std::fs::write(path, token).map_err(|e| {
                CoreError::Persistence(format!("writing {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    /// Current credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Drop the credential. Idempotent; always succeeds. Storage
    /// removal failures are logged, never surfaced.
    pub fn clear_credential(&self) {
        let had = self.tx.send_replace(None).is_some();
        if had {
            tracing::info!("Credential cleared");
        }

        if let Some(path) = &self.token_path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(error = %e, "Failed to remove persisted credential");
                }
            }
        }
    }

    /// Subscribe to credential replacements. The receiver is notified
    /// on every `set_credential`/`clear_credential`.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// `Authorization` header value, or `None` when signed out.
    pub fn bearer(&self) -> Option<String> {
        self.credential().map(|t| format!("Bearer {t}"))
    }

    /// Whether the stored credential decodes and is unexpired.
    ///
    /// Pure claim inspection -- no signature check, no network. A
    /// credential that passes here can still be rejected by the
    /// server, which remains the trust boundary.
    pub fn has_valid_credential(&self) -> bool {
        match self.credential() {
            Some(token) => claims::is_valid(&token),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
