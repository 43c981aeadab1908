// Streamlit server options: parsing, merging, and rendering as CLI flags.
//
// Options are opaque to this crate. Streamlit validates them; we only carry
// `key -> value` pairs and render them as `--key=value`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SERVER_ADDRESS: &str = "server.address";
pub const SERVER_PORT: &str = "server.port";
pub const SERVER_HEADLESS: &str = "server.headless";
pub const SERVER_ENABLE_CORS: &str = "server.enableCORS";
pub const SERVER_ENABLE_XSRF: &str = "server.enableXsrfProtection";
pub const SERVER_STATIC_SERVING: &str = "server.enableStaticServing";
pub const DEVELOPMENT_MODE: &str = "global.developmentMode";
pub const GATHER_USAGE_STATS: &str = "browser.gatherUsageStats";

/// Options the desktop window depends on. Overriding them is allowed but logged.
pub const EMBEDDING_CRITICAL: &[&str] = &[SERVER_ADDRESS, SERVER_HEADLESS, DEVELOPMENT_MODE];

/// Loopback host the server binds to and the window connects to.
pub const LOOPBACK_HOST: &str = "localhost";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u16> for OptionValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Ordered `option name -> value` map passed to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerOptions(BTreeMap<String, OptionValue>);

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Defaults required to host the server inside a desktop window.
    pub fn embedding_defaults(port: u16, allow_downloads: bool) -> Self {
        let mut defaults = Self::new()
            .with(SERVER_ADDRESS, LOOPBACK_HOST)
            .with(SERVER_PORT, port)
            .with(SERVER_HEADLESS, true)
            .with(SERVER_ENABLE_CORS, false)
            .with(SERVER_ENABLE_XSRF, false)
            .with(DEVELOPMENT_MODE, false)
            .with(GATHER_USAGE_STATS, false);
        if allow_downloads {
            defaults.insert(SERVER_STATIC_SERVING, true);
        }
        defaults
    }

    /// Render as `--key=value` arguments in key order.
    pub fn to_args(&self) -> Vec<String> {
        self.iter().map(|(key, value)| format!("--{key}={value}")).collect()
    }
}

impl FromIterator<(String, OptionValue)> for ServerOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `defaults ⊕ overrides`: every key from both maps, override values win.
pub fn merge(defaults: &ServerOptions, overrides: &ServerOptions) -> ServerOptions {
    let mut merged = defaults.clone();
    for (key, value) in overrides.iter() {
        merged.insert(key, value.clone());
    }
    merged
}

/// Keys from [`EMBEDDING_CRITICAL`] that `overrides` replaces with a different value.
pub fn overridden_embedding_keys<'a>(
    defaults: &ServerOptions,
    overrides: &'a ServerOptions,
) -> Vec<&'a str> {
    overrides
        .iter()
        .filter(|(key, value)| {
            EMBEDDING_CRITICAL.contains(key)
                && defaults.get(key).map(|default| default.to_string())
                    != Some(value.to_string())
        })
        .map(|(key, _)| key)
        .collect()
}

/// Parse command-line style Streamlit options into a map.
///
/// - `--key=value` sets `key` to `value`
/// - `--key value` sets `key` to `value`
/// - `--flag` with no value sets `flag` to `"true"`
/// - a value with no preceding key is ignored
pub fn parse_streamlit_options<S: AsRef<str>>(tokens: &[S]) -> ServerOptions {
    let mut options = ServerOptions::new();
    let mut pending_key: Option<String> = None;

    for token in tokens {
        let token = token.as_ref();
        if let Some(stripped) = token.strip_prefix("--") {
            let stripped = stripped.trim_start_matches('-');
            if let Some((key, value)) = stripped.split_once('=') {
                options.insert(key, value);
                pending_key = None;
            } else {
                options.insert(stripped, "true");
                pending_key = Some(stripped.to_string());
            }
        } else if let Some(key) = pending_key.take() {
            options.insert(key, token);
        }
    }

    options
}
