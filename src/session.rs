use crate::config::SessionConfig;
use crate::models::Credential;

/// Viewer context passed explicitly into recording and queries
#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Option<Credential>,
    referrer: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            credential: config.auth_token.as_deref().and_then(Credential::new),
            referrer: None,
        }
    }

    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Credential::new(token);
        self
    }

    /// Empty referrers are stored as `None`
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.referrer = if referrer.is_empty() {
            None
        } else {
            Some(referrer)
        };
        self
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }
}
