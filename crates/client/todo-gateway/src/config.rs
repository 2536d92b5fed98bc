//! Gateway configuration.

use std::time::Duration;

use url::Url;

use crate::error::GatewayResult;

/// Origin of the task API. There is no runtime override for it.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL
                .parse()
                .expect("valid default URL"),
            timeout: None,
        }
    }
}

impl ApiConfig {
    /// Points the gateway at another origin, e.g. a mock server in tests.
    ///
    /// A trailing slash is added so endpoint paths are joined below the base
    /// path instead of replacing its last segment.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base_url: Url::parse(&base)?,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
