//! Request value object

use crate::agent::value_objects::AgentId;
use crate::core::error::CouncilError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a multi-turn session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for SessionId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An incoming request to be routed through the council (Value Object)
///
/// Carries the request text, the session it belongs to, and optionally the
/// roster used on the previous turn of that session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    text: String,
    session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prior_roster: Option<Vec<AgentId>>,
}

impl Request {
    /// Create a new request, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>, session_id: impl Into<SessionId>) -> Result<Self, CouncilError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CouncilError::invalid_request("request text cannot be empty"));
        }
        Ok(Self {
            text,
            session_id: session_id.into(),
            prior_roster: None,
        })
    }

    pub fn with_prior_roster(mut self, roster: impl IntoIterator<Item = AgentId>) -> Self {
        self.prior_roster = Some(roster.into_iter().collect());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn prior_roster(&self) -> Option<&[AgentId]> {
        self.prior_roster.as_deref()
    }

    /// Normalized token set used for trigger matching.
    pub fn tokens(&self) -> BTreeSet<String> {
        tokenize(&self.text)
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Split text into lowercase word tokens.
///
/// Words are separated by anything that is not alphanumeric, `-` or `_`;
/// leading and trailing `-`/`_` are stripped from each word.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .map(normalize_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Normalize a single keyword the same way request tokens are normalized.
pub fn normalize_token(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '-' || c == '_')
        .to_lowercase()
}
