//! Glue over the external OpenID relying-party engine.
//!
//! The `openid` crate owns the protocol: provider discovery, the token
//! exchange, and assertion verification. This module reduces it to the two
//! calls the handlers need, an authorization URL to redirect the user to, and
//! a verified [`AuthOutcome`] on the way back.

use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use openid::{DiscoveredClient, Options};
use secrecy::ExposeSecret;
use url::Url;

/// Verified identity claims returned by the provider after a login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// Identity URL tying the session to a `users` row, derived from the
    /// provider issuer and the subject claim.
    pub identity_url: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Seconds since epoch of the provider-side authentication, when the
    /// provider includes the `auth_time` claim.
    pub auth_time: Option<i64>,
}

/// Seam between the handlers and the OpenID engine so flow tests can run
/// against a stub provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization URL to redirect the user agent to.
    fn auth_url(&self, state: &str, nonce: &str) -> Url;

    /// Exchange and verify the assertion the provider redirected back with.
    async fn verify(&self, code: &str, nonce: &str) -> Result<AuthOutcome>;
}

/// [`IdentityProvider`] backed by the `openid` crate's discovered client.
pub struct OidcProvider {
    client: DiscoveredClient,
}

impl OidcProvider {
    /// Discover the provider endpoints from the issuer URL.
    ///
    /// # Errors
    /// Returns an error if the issuer URL is invalid or discovery fails.
    pub async fn discover(globals: &GlobalArgs) -> Result<Self> {
        let issuer = Url::parse(&globals.issuer)
            .with_context(|| format!("Invalid issuer URL: {}", globals.issuer))?;

        let client = DiscoveredClient::discover(
            globals.client_id.clone(),
            globals.client_secret.expose_secret().to_string(),
            Some(globals.redirect_url.clone()),
            issuer,
        )
        .await?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn auth_url(&self, state: &str, nonce: &str) -> Url {
        self.client.auth_url(&Options {
            scope: Some("openid email profile".to_string()),
            state: Some(state.to_string()),
            nonce: Some(nonce.to_string()),
            ..Options::default()
        })
    }

    async fn verify(&self, code: &str, nonce: &str) -> Result<AuthOutcome> {
        // authenticate() runs the token exchange plus id_token decoding and
        // validation, including the nonce comparison.
        let token = self.client.authenticate(code, Some(nonce), None).await?;

        let id_token = token
            .id_token
            .as_ref()
            .ok_or_else(|| anyhow!("Provider response is missing an id_token"))?;

        let claims = id_token
            .payload()
            .map_err(|err| anyhow!("Invalid id_token payload: {err}"))?;

        Ok(AuthOutcome {
            identity_url: format!("{}#{}", claims.iss, claims.sub),
            name: claims
                .userinfo
                .name
                .clone()
                .or_else(|| claims.userinfo.nickname.clone()),
            email: claims.userinfo.email.clone(),
            auth_time: claims.auth_time,
        })
    }
}
