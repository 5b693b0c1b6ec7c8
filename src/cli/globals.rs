use secrecy::SecretString;

/// Provider configuration shared across the CLI actions.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub issuer: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(issuer: String) -> Self {
        Self {
            issuer,
            client_id: String::new(),
            client_secret: SecretString::default(),
            redirect_url: String::new(),
        }
    }

    pub fn set_client_secret(&mut self, secret: SecretString) {
        self.client_secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let issuer = "https://accounts.google.com".to_string();
        let args = GlobalArgs::new(issuer);
        assert_eq!(args.issuer, "https://accounts.google.com");
        assert_eq!(args.client_secret.expose_secret(), "");
    }
}
