use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::error::ProviderError;

/// Secret credential; never printed in full.
#[derive(Clone, Default)]
pub struct ApiKey(Cow<'static, str>);

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub fn from_env(var_name: &str) -> Result<Self, ProviderError> {
        match std::env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(Cow::Owned(value))),
            _ => Err(ProviderError::Configuration(format!(
                "Environment variable {var_name} not set"
            ))),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.len();
        if len > 8 && self.0.is_char_boundary(4) && self.0.is_char_boundary(len - 3) {
            write!(f, "ApiKey({}...{})", &self.0[..4], &self.0[len - 3..])
        } else if len > 0 {
            write!(f, "ApiKey(***)")
        } else {
            write!(f, "ApiKey(<empty>)")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(Cow<'static, str>);

impl ModelId {
    #[must_use]
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Endpoint root without a trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl(Cow<'static, str>);

impl BaseUrl {
    #[must_use]
    pub fn new(url: impl Into<Cow<'static, str>>) -> Self {
        let url = url.into();
        if url.ends_with('/') {
            Self(Cow::Owned(url.trim_end_matches('/').to_string()))
        } else {
            Self(url)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl From<String> for BaseUrl {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
