//! Client configuration: request options, credentials, security schemes and the
//! server URL a client talks to.
//!
//! Everything here is plain data owned by a single client instance. Nothing is
//! process-global, so two clients configured differently never see each other's
//! settings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::operations::{API_TITLE, API_VERSION, DEFAULT_SERVER, SECURITY_SCHEME};

/// Per-request timeout used until [`ClientOptions::timeout`] overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors raised by server and credential setters, or by applying
/// credentials at request time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("server URL template `{0}` has an unterminated or empty placeholder")]
    MalformedTemplate(String),
    #[error("server URL variable `{0}` has no value and no declared default")]
    UnresolvedServerVariable(String),
    #[error("invalid server URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server URL `{0}` cannot be used as a base URL")]
    NotABase(String),
    #[error("credentials were supplied but the API declares no security scheme")]
    NoSecurityScheme,
    #[error("{scheme} authentication takes {expected} credential value(s), got {given}")]
    CredentialShape {
        scheme: &'static str,
        expected: usize,
        given: usize,
    },
}

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyLocation {
    Header,
    Query,
}

/// How credentials are attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityScheme {
    /// HTTP basic auth: username and optional password.
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// An API key sent as a header or query parameter named `name`.
    ApiKey {
        name: &'static str,
        location: ApiKeyLocation,
    },
}

impl SecurityScheme {
    fn label(&self) -> &'static str {
        match self {
            SecurityScheme::Basic => "basic",
            SecurityScheme::Bearer => "bearer",
            SecurityScheme::ApiKey { .. } => "API key",
        }
    }
}

/// A variable of a server URL template together with its declared default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerVariable {
    pub name: &'static str,
    pub default: &'static str,
}

/// A server declared by the API document, possibly templated (`https://{network}.host/v1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDefinition {
    pub url: &'static str,
    pub variables: &'static [ServerVariable],
}

impl ServerDefinition {
    /// Declared default for the variable `name`, if any.
    pub fn default_for(&self, name: &str) -> Option<&'static str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.default)
    }

    /// The server URL with every placeholder replaced by its declared default.
    pub fn default_url(&self) -> String {
        substitute(self.url, |name| self.default_for(name).map(str::to_string))
            .unwrap_or_else(|_| self.url.to_string())
    }
}

/// One or two opaque credential values.
///
/// Which value means what depends on the [`SecurityScheme`]: basic auth reads
/// them as username and password, bearer and API key schemes take exactly one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    primary: String,
    secondary: Option<String>,
}

impl Credentials {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn pair(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }

    /// Number of values supplied (1 or 2).
    pub fn count(&self) -> usize {
        1 + usize::from(self.secondary.is_some())
    }

    /// Resolve these credentials against `scheme` into what goes on the wire.
    pub fn authorization(
        &self,
        scheme: Option<SecurityScheme>,
    ) -> Result<Authorization, ConfigError> {
        let scheme = scheme.ok_or(ConfigError::NoSecurityScheme)?;

        if !matches!(scheme, SecurityScheme::Basic) && self.secondary.is_some() {
            return Err(ConfigError::CredentialShape {
                scheme: scheme.label(),
                expected: 1,
                given: self.count(),
            });
        }

        Ok(match scheme {
            SecurityScheme::Basic => Authorization::Basic {
                username: self.primary.clone(),
                password: self.secondary.clone(),
            },
            SecurityScheme::Bearer => Authorization::Bearer(self.primary.clone()),
            SecurityScheme::ApiKey {
                name,
                location: ApiKeyLocation::Header,
            } => Authorization::Header {
                name,
                value: self.primary.clone(),
            },
            SecurityScheme::ApiKey {
                name,
                location: ApiKeyLocation::Query,
            } => Authorization::Query {
                name,
                value: self.primary.clone(),
            },
        })
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("values", &self.count())
            .finish_non_exhaustive()
    }
}

impl From<&str> for Credentials {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credentials {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for Credentials {
    fn from(value: u64) -> Self {
        Self::new(value.to_string())
    }
}

impl From<i64> for Credentials {
    fn from(value: i64) -> Self {
        Self::new(value.to_string())
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Credentials {
    fn from((primary, secondary): (A, B)) -> Self {
        Self::pair(primary, secondary)
    }
}

/// Credentials resolved against a security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer(String),
    Header {
        name: &'static str,
        value: String,
    },
    Query {
        name: &'static str,
        value: String,
    },
}

/// Options accepted by `configure`. Unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout in milliseconds.
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// State read by every request a client issues.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    timeout: Duration,
    user_agent: String,
    credentials: Option<Credentials>,
    security: Option<SecurityScheme>,
    server: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            credentials: None,
            security: SECURITY_SCHEME,
            server: DEFAULT_SERVER.default_url(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at `server`, used verbatim.
    pub fn with_server(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn security_scheme(&self) -> Option<SecurityScheme> {
        self.security
    }

    /// Base URL every operation path is appended to.
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn apply(&mut self, options: ClientOptions) {
        if let Some(timeout) = options.timeout {
            self.timeout = timeout;
        }
        if let Some(user_agent) = options.user_agent {
            self.user_agent = user_agent;
        }
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    pub fn set_security_scheme(&mut self, scheme: SecurityScheme) {
        self.security = Some(scheme);
    }

    /// Resolve `template` with `variables` and make it the base URL.
    ///
    /// On error the previous server is kept.
    pub fn set_server<I, K, V>(&mut self, template: &str, variables: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let variables: HashMap<String, String> = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.server = resolve_server_url(template, &variables, &DEFAULT_SERVER)?;
        Ok(())
    }
}

/// `<api title>/<api version> (<crate>/<crate version>)`
pub fn default_user_agent() -> String {
    format!(
        "{API_TITLE}/{API_VERSION} ({}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Substitute `{name}` placeholders of `template`.
///
/// When `template` is the `declared` server's URL, a placeholder missing from
/// `variables` takes its declared default. Any other unfilled placeholder fails
/// the call. Variables that match no placeholder are ignored.
/// The result must parse as an absolute URL that can carry a path.
pub fn resolve_server_url(
    template: &str,
    variables: &HashMap<String, String>,
    declared: &ServerDefinition,
) -> Result<String, ConfigError> {
    let declared_template = template == declared.url;
    let resolved = substitute(template, |name| {
        variables.get(name).cloned().or_else(|| {
            declared_template
                .then(|| declared.default_for(name))
                .flatten()
                .map(str::to_string)
        })
    })?;

    let url = Url::parse(&resolved).map_err(|source| ConfigError::InvalidUrl {
        url: resolved.clone(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase(resolved));
    }

    Ok(resolved.trim_end_matches('/').to_string())
}

fn substitute(
    template: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| ConfigError::MalformedTemplate(template.to_string()))?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            return Err(ConfigError::MalformedTemplate(template.to_string()));
        }
        let value =
            lookup(name).ok_or_else(|| ConfigError::UnresolvedServerVariable(name.to_string()))?;
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
