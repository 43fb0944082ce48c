// Core commands
pub mod apply;
pub mod plan;
pub mod validate;

use anyhow::{Context, Result};
use drive::DriveClient;
use reconcile::{DesiredState, DesiredStateSource};

use crate::config::RunConfig;
use crate::definition::PermissionFile;

/// Load and validate the permission file named in the config
fn load_definition(config: &RunConfig) -> Result<DesiredState> {
    PermissionFile::new(&config.permission_file)
        .with_debug(config.debug)
        .load()
}

/// Build a Drive client from the credential file named in the config
fn connect(config: &RunConfig) -> Result<DriveClient> {
    let client = DriveClient::from_credential_file(&config.credential_file)
        .context("Failed to load Google API credentials")?;
    log::info!("Authenticating as {}", client.client_email());
    Ok(client)
}
