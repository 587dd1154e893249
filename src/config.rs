//! Settings for the hosted backend, read from the environment.

use crate::Error;

/// The environment variable holding the base URL of the Supabase project.
pub const SUPABASE_URL: &str = "SUPABASE_URL";
/// The environment variable holding the Supabase anonymous (public) API key.
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
/// The environment variable naming the table the transactions are stored in.
pub const SUPABASE_TABLE: &str = "SUPABASE_TABLE";

/// The table used when [SUPABASE_TABLE] is not set.
pub const DEFAULT_TABLE: &str = "transactions";

/// How to reach the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// The project URL without a trailing slash, e.g. "https://abc.supabase.co".
    pub url: String,
    /// The anonymous API key, sent with every request.
    pub api_key: String,
    /// The name of the transactions table.
    pub table: String,
}

impl BackendConfig {
    /// Read the config from the process environment.
    ///
    /// # Errors
    /// See [BackendConfig::from_lookup].
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config using `lookup` to get the value of each environment variable.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::MissingConfig] if the URL or key is not set or is blank,
    /// - [Error::InvalidConfig] if the URL does not start with "http://" or "https://".
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingConfig(name))
        };

        let url = required(SUPABASE_URL)?;
        let api_key = required(SUPABASE_ANON_KEY)?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::InvalidConfig(
                SUPABASE_URL,
                format!("\"{url}\" is not an http(s) URL"),
            ));
        }

        let table = lookup(SUPABASE_TABLE)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_owned());

        Ok(Self {
            url: url.trim_end_matches('/').to_owned(),
            api_key,
            table,
        })
    }
}
