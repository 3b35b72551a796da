use anyhow::Result;
use std::path::Path;
use tracing::warn;

use crate::session::Session;
use crate::store::StoreAvailability;

/// Show the local identity, optionally renaming it
pub fn whoami(
    availability: &StoreAvailability,
    session: &mut Session,
    session_path: &Path,
    name: Option<String>,
) -> Result<()> {
    if let Some(name) = name {
        session.set_user_name(&name, session_path)?;

        match availability.require() {
            Ok(store) => store.rename_user(&session.session_id, &session.user_name)?,
            Err(e) => warn!(error = %e, "name saved locally only"),
        }
        println!("Name updated.");
    }

    println!("Name:    {}", session.user_name);
    println!("Session: {}", session.session_id);
    println!("Stored:  {}", session_path.display());
    Ok(())
}
