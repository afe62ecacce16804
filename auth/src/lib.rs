//! Authorization header resolution
//!
//! Credentials are turned into at most one `Authorization` header before a
//! run starts. Supported schemes:
//!
//! - Bearer API keys
//! - HTTP Basic (pre-encoded or from user/password)
//! - No authentication
//! - A verbatim header override

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// API key value that means "no key"
pub const PLACEHOLDER_API_KEY: &str = "default";

/// Authentication errors; all of them abort the run before dispatch
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown `--auth-type`
    #[error("unsupported auth type '{0}', valid options: auto, basic, bearer, none")]
    UnsupportedType(String),

    /// Bearer selected without a key
    #[error("bearer authentication requires an API key")]
    MissingApiKey,

    /// Basic selected without usable material
    #[error(
        "basic authentication requires an API key starting with 'Basic ', \
         an explicit authorization header, or both a user and a password"
    )]
    MissingBasicCredentials,

    /// The resulting header contains characters HTTP does not allow
    #[error("invalid authorization header value")]
    InvalidHeader,
}

/// Requested authentication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Pick from the credentials that were given
    #[default]
    Auto,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: Basic <token>`
    Basic,
    /// No header
    None,
}

impl AuthType {
    /// Identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Auto => "auto",
            AuthType::Bearer => "bearer",
            AuthType::Basic => "basic",
            AuthType::None => "none",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(AuthType::Auto),
            "bearer" => Ok(AuthType::Bearer),
            "basic" => Ok(AuthType::Basic),
            "none" => Ok(AuthType::None),
            other => Err(AuthError::UnsupportedType(other.to_string())),
        }
    }
}

/// Credentials as supplied by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Requested strategy
    #[serde(default)]
    pub auth_type: AuthType,

    /// API key; empty or `default` means none
    #[serde(default)]
    pub api_key: Option<String>,

    /// Basic auth user
    #[serde(default)]
    pub basic_auth_user: Option<String>,

    /// Basic auth password
    #[serde(default)]
    pub basic_auth_password: Option<String>,

    /// Verbatim `Authorization` value; wins over everything else
    #[serde(default)]
    pub auth_header: Option<String>,
}

/// Result of resolving an [`AuthConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuth {
    /// Strategy actually used (`Auto` only for header overrides)
    pub scheme: AuthType,
    /// Header to attach to every request
    pub header: Option<HeaderValue>,
}

impl AuthConfig {
    /// Config with just an API key and automatic detection
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Set the strategy
    pub fn auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Set basic auth user and password
    pub fn basic(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth_user = Some(user.into());
        self.basic_auth_password = Some(password.into());
        self
    }

    /// Set a verbatim header override
    pub fn header_override(mut self, value: impl Into<String>) -> Self {
        self.auth_header = Some(value.into());
        self
    }

    /// API key with placeholders removed
    pub fn normalized_api_key(&self) -> Option<&str> {
        let key = self.api_key.as_deref()?.trim();
        if key.is_empty() || key.eq_ignore_ascii_case(PLACEHOLDER_API_KEY) {
            None
        } else {
            Some(key)
        }
    }

    fn basic_pair(&self) -> Option<(&str, &str)> {
        match (&self.basic_auth_user, &self.basic_auth_password) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    /// Strategy `Auto` resolves to
    pub fn effective_type(&self) -> AuthType {
        if self.auth_type != AuthType::Auto {
            return self.auth_type;
        }
        match self.normalized_api_key() {
            _ if self.basic_pair().is_some() => AuthType::Basic,
            Some(key) if is_basic_token(key) => AuthType::Basic,
            Some(_) => AuthType::Bearer,
            None => AuthType::None,
        }
    }

    /// Resolve the header value
    ///
    /// # Errors
    /// Bearer without a key, basic without material, or a value that is not
    /// a valid header.
    pub fn resolve(&self) -> Result<ResolvedAuth, AuthError> {
        if let Some(header) = self.auth_header.as_deref().filter(|h| !h.trim().is_empty()) {
            info!("Using explicit authorization header");
            return Ok(ResolvedAuth {
                scheme: AuthType::Auto,
                header: Some(to_header(header.trim())?),
            });
        }

        let scheme = self.effective_type();
        let value = match scheme {
            AuthType::Basic => Some(self.basic_header()?),
            AuthType::Bearer => {
                let key = self.normalized_api_key().ok_or(AuthError::MissingApiKey)?;
                Some(format!("Bearer {key}"))
            }
            AuthType::None | AuthType::Auto => None,
        };

        info!(auth_type = %scheme, "Resolved authentication");
        Ok(ResolvedAuth {
            scheme,
            header: value.as_deref().map(to_header).transpose()?,
        })
    }

    fn basic_header(&self) -> Result<String, AuthError> {
        if let Some(key) = self.normalized_api_key().filter(|k| is_basic_token(k)) {
            return Ok(key.to_string());
        }
        let (user, password) = self
            .basic_pair()
            .ok_or(AuthError::MissingBasicCredentials)?;
        Ok(format!("Basic {}", STANDARD.encode(format!("{user}:{password}"))))
    }
}

fn is_basic_token(key: &str) -> bool {
    key.get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("basic "))
}

fn to_header(value: &str) -> Result<HeaderValue, AuthError> {
    let mut header = HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeader)?;
    header.set_sensitive(true);
    Ok(header)
}
