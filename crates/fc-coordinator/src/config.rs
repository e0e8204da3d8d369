//! Client configuration
//!
//! [`ClientConfig`] describes the API endpoint and how the cache treats the
//! forum schema. [`RenderContext`] tells the client whether it runs in a
//! browser or during server-side rendering, where the incoming request's
//! cookie has to be forwarded to the API.

use crate::documents::{PAGINATED_POSTS, PAGINATED_REPLIES};
use crate::error::ConfigError;
use crate::pagination::PaginationConfig;
use fc_store::KeyingConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Environment variable holding the API url
pub const API_URL_ENV: &str = "FORUM_API_URL";

/// Default API url for local development
pub const DEFAULT_API_URL: &str = "http://localhost:4000/graphql";

/// Fetch credentials mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    /// Never send cookies
    Omit,
    /// Send cookies to the same origin only
    SameOrigin,
    /// Always send cookies
    #[default]
    Include,
}

impl Credentials {
    /// Fetch API spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Omit => "omit",
            Self::SameOrigin => "same-origin",
            Self::Include => "include",
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// GraphQL endpoint
    pub api_url: String,
    /// Cookie policy for requests
    pub credentials: Credentials,
    /// Root fields resolved by merging all cached pages
    pub paginated_fields: Vec<PaginationConfig>,
    /// Typenames stored embedded even when they carry an id
    pub unkeyed_types: BTreeSet<String>,
    /// Drop unreachable records after each mutation
    pub collect_garbage: bool,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API url
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// With credentials mode
    #[inline]
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Add a paginated root field
    #[inline]
    #[must_use]
    pub fn with_paginated_field(mut self, config: PaginationConfig) -> Self {
        self.paginated_fields.push(config);
        self
    }

    /// Add an unkeyed typename
    #[inline]
    #[must_use]
    pub fn with_unkeyed_type(mut self, typename: impl Into<String>) -> Self {
        self.unkeyed_types.insert(typename.into());
        self
    }

    /// With garbage collection after mutations
    #[inline]
    #[must_use]
    pub fn with_collect_garbage(mut self, enabled: bool) -> Self {
        self.collect_garbage = enabled;
        self
    }

    /// Default configuration with the API url taken from [`API_URL_ENV`]
    ///
    /// # Errors
    /// Returns error if the variable is unset or empty
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`] with a custom variable lookup
    ///
    /// # Errors
    /// Returns error if the variable is unset or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_ENV)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingApiUrl { var: API_URL_ENV })?;
        Ok(Self::default().with_api_url(api_url))
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns error if the url is not http(s) or a field is paginated twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }

        let mut seen = BTreeSet::new();
        for field in &self.paginated_fields {
            if !seen.insert(field.field_name.as_str()) {
                return Err(ConfigError::DuplicatePaginatedField(field.field_name.clone()));
            }
        }
        Ok(())
    }

    /// Entity keying derived from the unkeyed typenames
    #[must_use]
    pub fn keying(&self) -> KeyingConfig {
        self.unkeyed_types
            .iter()
            .fold(KeyingConfig::new(), |keying, typename| keying.with_unkeyed(typename.clone()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials: Credentials::default(),
            paginated_fields: vec![PaginationConfig::posts()],
            unkeyed_types: [PAGINATED_POSTS, PAGINATED_REPLIES]
                .into_iter()
                .map(String::from)
                .collect(),
            collect_garbage: true,
        }
    }
}

/// Where the client runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderContext {
    /// In the browser; cookies are attached by the fetch layer
    #[default]
    Browser,
    /// During server-side rendering of an incoming request
    Server {
        /// `cookie` header of the incoming request, if any
        cookie: Option<String>,
    },
}

impl RenderContext {
    /// Server-side context forwarding `cookie`
    #[must_use]
    pub fn server(cookie: Option<String>) -> Self {
        Self::Server { cookie }
    }

    /// Whether this is server-side rendering
    #[inline]
    #[must_use]
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// Options handed to the network layer for every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOptions {
    /// GraphQL endpoint
    pub url: String,
    /// Cookie policy
    pub credentials: Credentials,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl FetchOptions {
    /// Build options for `config` in `context`
    #[must_use]
    pub fn new(config: &ClientConfig, context: &RenderContext) -> Self {
        let mut headers = BTreeMap::new();
        if let RenderContext::Server {
            cookie: Some(cookie),
        } = context
        {
            headers.insert("cookie".to_string(), cookie.clone());
        }
        Self {
            url: config.api_url.clone(),
            credentials: config.credentials,
            headers,
        }
    }
}
