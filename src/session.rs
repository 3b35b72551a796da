//! Local session identity
//!
//! Each installation gets an opaque session id, created on first use and
//! kept in a small YAML file, plus a display name. Nothing is verified
//! server-side; the session id is used directly as the user key on bills.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub user_name: String,
}

impl Session {
    /// A fresh identity with the default display name
    pub fn generate() -> Self {
        let session_id = Uuid::new_v4().to_string();
        let user_name = Self::default_name(&session_id);
        Self {
            session_id,
            user_name,
        }
    }

    /// `User-` followed by the first four characters of the session id
    pub fn default_name(session_id: &str) -> String {
        let prefix: String = session_id.chars().take(4).collect();
        format!("User-{}", prefix)
    }

    /// Read the session file, creating and persisting a new identity when missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read session file {}", path.display()))?;
            let mut session: Session = serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid session file {}", path.display()))?;

            if session.session_id.trim().is_empty() {
                bail!("Session file {} has an empty session id", path.display());
            }
            if session.user_name.trim().is_empty() {
                session.user_name = Self::default_name(&session.session_id);
                session.save(path)?;
            }
            return Ok(session);
        }

        let session = Self::generate();
        session.save(path)?;
        info!(session = %session.session_id, path = %path.display(), "new session created");
        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        Ok(())
    }

    pub fn set_user_name(&mut self, name: &str, path: &Path) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Name cannot be empty");
        }
        self.user_name = name.to_string();
        self.save(path)
    }

    /// Key used for selections and payments
    pub fn user_id(&self) -> &str {
        &self.session_id
    }
}
