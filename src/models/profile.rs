//! Profile identifiers and the visit event

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("handle must not be empty")]
    EmptyHandle,
    #[error("unknown period '{0}', expected one of: day, week, month, all")]
    UnknownPeriod(String),
    #[error("invalid ISO-8601 date '{0}'")]
    InvalidDate(String),
}

/// Public identifier of a profile page (username-like)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ModelError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ModelError::EmptyHandle);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Handle {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Handle {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

/// Aggregation window selected for the statistics view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    #[default]
    Week,
    Month,
    All,
}

impl Period {
    /// All periods in button order
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::All];

    /// Value sent as the `period` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::All => "all",
        }
    }

    /// Button label shown in the period selector
    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "Día",
            Period::Week => "Semana",
            Period::Month => "Mes",
            Period::All => "Todo",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ModelError;

    /// Accepts wire names and button labels, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == needle || p.label().to_lowercase() == needle)
            .ok_or_else(|| ModelError::UnknownPeriod(s.to_string()))
    }
}

/// Bearer token of an authenticated viewer
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank tokens so they are never sent as `Bearer `
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn bearer_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A single recorded page-view of a profile
#[derive(Debug, Clone)]
pub struct VisitEvent {
    /// Profile owner being visited
    pub handle: Handle,

    /// Referrer at fire time, `None` when unknown
    pub referrer: Option<String>,

    /// Viewer credential, when the viewer is signed in
    pub credential: Option<Credential>,
}

impl VisitEvent {
    pub fn new(handle: &Handle, session: &Session) -> Self {
        Self {
            handle: handle.clone(),
            referrer: session.referrer().map(str::to_string),
            credential: session.credential().cloned(),
        }
    }
}
