//! Client configuration.

use crate::error::{ClientError, ClientResult};
use crate::transport::{BasicAuth, RequestDecorator};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Service address used when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Options recognised when building a [`SyncServiceClient`](crate::SyncServiceClient).
///
/// An empty `org_id` puts the client in edge mode; any other value addresses
/// a hub on behalf of that organization.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the sync service node.
    pub url: String,
    /// Organization the client acts for. Empty for edge mode.
    pub org_id: String,
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    /// Extra trusted root certificate in PEM format.
    pub ca_certificate_pem: Option<String>,
    /// Skip TLS hostname verification.
    pub accept_invalid_hostnames: bool,
    /// Connect timeout. `0` disables it.
    pub connect_timeout_millis: Option<i64>,
    /// Read timeout. `0` disables it.
    pub read_timeout_millis: Option<i64>,
    /// Longest a payload upload may stall between chunks. `0` disables it.
    pub write_timeout_millis: Option<i64>,
    /// One extra step applied to every request after authentication.
    #[serde(skip)]
    pub interceptor: Option<Interceptor>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            org_id: String::new(),
            app_key: None,
            app_secret: None,
            ca_certificate_pem: None,
            accept_invalid_hostnames: false,
            connect_timeout_millis: None,
            read_timeout_millis: None,
            write_timeout_millis: None,
            interceptor: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("org_id", &self.org_id)
            .field("app_key", &self.app_key)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field("ca_certificate_pem", &self.ca_certificate_pem.is_some())
            .field("accept_invalid_hostnames", &self.accept_invalid_hostnames)
            .field("connect_timeout_millis", &self.connect_timeout_millis)
            .field("read_timeout_millis", &self.read_timeout_millis)
            .field("write_timeout_millis", &self.write_timeout_millis)
            .field("interceptor", &self.interceptor)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for an edge node client at `url`.
    pub fn edge(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Configuration for a hub client acting for `org_id`.
    pub fn hub(url: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            org_id: org_id.into(),
            ..Default::default()
        }
    }

    /// Sets the application key and secret used for Basic authentication.
    #[must_use]
    pub fn with_credentials(mut self, app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self.app_secret = Some(app_secret.into());
        self
    }

    #[must_use]
    pub fn with_interceptor(mut self, decorator: impl RequestDecorator + 'static) -> Self {
        self.interceptor = Some(Interceptor::new(decorator));
        self
    }

    /// Checks every option, failing on the first invalid one.
    pub fn validate(&self) -> ClientResult<()> {
        self.base_url()?;

        for (name, value) in [
            ("connect timeout", self.connect_timeout_millis),
            ("read timeout", self.read_timeout_millis),
            ("write timeout", self.write_timeout_millis),
        ] {
            if let Some(millis) = value {
                if millis < 0 {
                    return Err(ClientError::Config(format!(
                        "{name} must not be negative, got {millis}ms"
                    )));
                }
            }
        }

        if self.app_key.is_some() != self.app_secret.is_some() {
            return Err(ClientError::Config(
                "app key and app secret must be set together".to_string(),
            ));
        }

        Ok(())
    }

    /// Parses `url`, which must be an absolute http or https URL.
    pub fn base_url(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| ClientError::Config(format!("invalid URL {:?}: {e}", self.url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::Config(format!(
                "unsupported URL scheme {other:?}, expected http or https"
            ))),
        }
    }

    pub fn is_edge(&self) -> bool {
        self.org_id.is_empty()
    }

    pub(crate) fn credentials(&self) -> Option<BasicAuth> {
        match (&self.app_key, &self.app_secret) {
            (Some(key), Some(secret)) => Some(BasicAuth::new(key.clone(), secret.clone())),
            _ => None,
        }
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis_to_timeout(self.connect_timeout_millis)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis_to_timeout(self.read_timeout_millis)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis_to_timeout(self.write_timeout_millis)
    }
}

fn millis_to_timeout(millis: Option<i64>) -> Option<Duration> {
    millis
        .and_then(|m| u64::try_from(m).ok())
        .filter(|m| *m > 0)
        .map(Duration::from_millis)
}

/// Shared handle to a user-supplied [`RequestDecorator`].
#[derive(Clone)]
pub struct Interceptor(Arc<dyn RequestDecorator>);

impl Interceptor {
    pub fn new(decorator: impl RequestDecorator + 'static) -> Self {
        Self(Arc::new(decorator))
    }

    pub(crate) fn decorator(&self) -> Arc<dyn RequestDecorator> {
        Arc::clone(&self.0)
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Interceptor(..)")
    }
}
