//! Connection configuration.
//!
//! A [`ConnectionConfig`] is created once by the caller and only read by the
//! client afterwards. It can be built programmatically with the `with_*`
//! setters or loaded from the environment and an optional `kunai.toml`.

mod proxy;


use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use config::Config;
use serde::Deserialize;

use crate::constants::{CONFIG_FILE, ENV_PREFIX, USER_AGENT};
use crate::error::CoreResult;
use crate::trace::TraceSink;

pub use proxy::ProxySetting;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server URL without trailing slash. A path in it (`https://host/nextcloud`)
    /// prefixes every request path.
    pub server: String,
    /// Path of the collection used as root. See [`ConnectionConfig::root_path`].
    pub base_path: String,
    /// Port override.
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Windows-style authentication domain, sent as `DOMAIN\user`.
    pub domain: Option<String>,
    /// OAuth-style bearer token.
    pub bearer_token: Option<String>,
    /// Session cookies (`name=value`) bound to the server URL.
    pub cookies: Vec<String>,
    pub proxy: ProxySetting,
    pub proxy_user: Option<String>,
    pub proxy_password: Option<String>,
    /// Headers added to every request.
    pub headers: BTreeMap<String, String>,
    /// Skips TLS certificate validation for this client only.
    pub accept_invalid_certs: bool,
    /// Sends `Expect: 100-continue` with request bodies.
    pub expect_continue: bool,
    pub user_agent: String,
    /// Overall request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Verbose wire trace output.
    #[serde(skip)]
    pub trace: Option<Arc<dyn TraceSink>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            base_path: "/".to_owned(),
            port: None,
            user: None,
            password: None,
            domain: None,
            bearer_token: None,
            cookies: Vec::new(),
            proxy: ProxySetting::System,
            proxy_user: None,
            proxy_password: None,
            headers: BTreeMap::new(),
            accept_invalid_certs: false,
            expect_continue: false,
            user_agent: USER_AGENT.to_owned(),
            timeout_ms: None,
            trace: None,
        }
    }
}

impl ConnectionConfig {
    /// ## Summary
    /// Creates a configuration for the given server URL with default settings.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
        .normalized()
    }

    /// ## Summary
    /// Loads configuration from environment variables (`KUNAI_*`, nested keys
    /// separated by `__`) and an optional `kunai.toml`, which wins over the
    /// environment.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> CoreResult<Self> {
        Self::load_from(CONFIG_FILE, None)
    }

    /// Layers defaults, the environment (or `env` in its place) and the
    /// optional file `file_name`, later sources overriding earlier ones.
    fn load_from(file_name: &str, env: Option<config::Map<String, String>>) -> CoreResult<Self> {
        let settings: Self = Config::builder()
            .set_default("base_path", "/")?
            .set_default("proxy", "System")?
            .set_default("user_agent", USER_AGENT)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cookies")
                    .source(env),
            )
            .add_source(config::File::with_name(file_name).required(false))
            .build()?
            .try_deserialize()?;

        Ok(settings.normalized())
    }

    /// Trims the trailing slash from the server URL and normalizes the base path.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.server = self.server.trim().trim_end_matches('/').to_owned();
        self.base_path = normalize_base_path(&self.base_path);
        self
    }

    /// ## Summary
    /// Returns the base path, always starting and ending with `/`.
    #[must_use]
    pub fn root_path(&self) -> String {
        normalize_base_path(&self.base_path)
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Returns whether basic credentials are configured.
    #[must_use]
    pub fn has_basic_credentials(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Returns whether a cookie session is configured.
    #[must_use]
    pub fn has_cookie_session(&self) -> bool {
        !self.cookies.is_empty()
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<ProxySetting>) -> Self {
        self.proxy = proxy.into();
        self
    }

    #[must_use]
    pub fn with_proxy_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.proxy_user = Some(user.into());
        self.proxy_password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub fn with_expect_continue(mut self, expect: bool) -> Self {
        self.expect_continue = expect;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("server", &self.server)
            .field("base_path", &self.base_path)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("domain", &self.domain)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("cookies", &self.cookies.len())
            .field("proxy", &self.proxy)
            .field("proxy_user", &self.proxy_user)
            .field("headers", &self.headers)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("expect_continue", &self.expect_continue)
            .field("user_agent", &self.user_agent)
            .field("timeout_ms", &self.timeout_ms)
            .field("trace", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

/// ## Summary
/// Normalizes a base path so it starts and ends with `/`.
///
/// `""`, `"/"` and `"//"` all become `"/"`; `"dav"` and `"/dav/"` become `"/dav/"`.
#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> CoreResult<ConnectionConfig> {
    dotenvy::dotenv().ok();

    ConnectionConfig::load()
}
