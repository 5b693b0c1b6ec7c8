use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::{api, openid::OidcProvider};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Discovery happens once at startup, the provider metadata is
            // shared by every request after that.
            let provider = OidcProvider::discover(globals)
                .await
                .context("Failed to discover OpenID provider")?;

            api::new(port, dsn, Arc::new(provider)).await?;
        }
    }

    Ok(())
}
