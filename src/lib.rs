//! # Oidportal (OpenID sign-in portal)
//!
//! `oidportal` is a small demonstration service showing how to wire an
//! external OpenID relying-party library into an axum application, with
//! profile persistence in a `users` table.
//!
//! ## Login handshake
//!
//! 1. The user submits an OpenID identifier on `/login`; the service stores
//!    the flow state in the session and redirects to the identity provider.
//! 2. The provider redirects back to `/login` with an assertion; the external
//!    engine verifies it and yields the identity URL. Known identities are
//!    signed in, first-time identities are sent to `/create-profile`.
//!
//! The OpenID protocol itself (discovery, token exchange, assertion
//! verification) lives entirely in the `openid` crate; this crate only
//! registers routes, reads session state, and performs trivial CRUD.

pub mod api;
pub mod cli;
pub mod openid;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
