use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action plus the shared provider config.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let issuer = matches
        .get_one::<String>("issuer")
        .cloned()
        .context("missing required argument: --issuer")?;

    let mut globals = GlobalArgs::new(issuer);

    globals.client_id = matches
        .get_one::<String>("client-id")
        .cloned()
        .context("missing required argument: --client-id")?;

    let client_secret = matches
        .get_one::<String>("client-secret")
        .cloned()
        .context("missing required argument: --client-secret")?;

    globals.set_client_secret(SecretString::from(client_secret));

    globals.redirect_url = matches
        .get_one::<String>("redirect-url")
        .cloned()
        .context("missing required argument: --redirect-url")?;

    Ok((Action::Server { port, dsn }, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_matches() {
        temp_env::with_vars([("OIDPORTAL_LOG_LEVEL", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "oidportal",
                "--dsn",
                "sqlite://oidportal.db",
                "--issuer",
                "https://accounts.google.com",
                "--client-id",
                "client-id",
                "--client-secret",
                "client-secret",
            ]);

            let (action, globals) = handler(&matches).unwrap();

            let Action::Server { port, dsn } = action;
            assert_eq!(port, 8080);
            assert_eq!(dsn, "sqlite://oidportal.db");
            assert_eq!(globals.issuer, "https://accounts.google.com");
            assert_eq!(globals.client_id, "client-id");
            assert_eq!(globals.client_secret.expose_secret(), "client-secret");
            assert_eq!(globals.redirect_url, "http://localhost:8080/login");
        });
    }
}
