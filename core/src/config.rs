//! Client configuration resolved from arguments and the environment.
//!
//! Explicit arguments win; otherwise `YUPDATES_API_TOKEN` and
//! `YUPDATES_API_URL` are consulted. The token is mandatory, the base URL
//! falls back to [`DEFAULT_API_URL`].

use std::env;

use crate::client::YupdatesClient;
use crate::error::{ApiError, ApiResult};

pub const TOKEN_ENV_VAR: &str = "YUPDATES_API_TOKEN";
pub const BASE_URL_ENV_VAR: &str = "YUPDATES_API_URL";

pub const DEFAULT_API_URL: &str = "https://feeds.yupdates.com/api/v0/";

/// Token and base URL for one client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: String,
    pub base_url: String,
}

impl ClientConfig {
    /// Resolve against the process environment.
    pub fn resolve(token: Option<String>, base_url: Option<String>) -> ApiResult<Self> {
        Self::resolve_with(token, base_url, env_lookup)
    }

    /// Resolve with a caller-supplied variable lookup. Empty values count as
    /// unset.
    pub fn resolve_with<F>(token: Option<String>, base_url: Option<String>, lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: String| if v.trim().is_empty() { None } else { Some(v) };

        let token = token
            .and_then(non_empty)
            .or_else(|| lookup(TOKEN_ENV_VAR).and_then(non_empty))
            .ok_or_else(|| ApiError::config(format!("API token is missing: set {TOKEN_ENV_VAR}")))?;

        let base_url = base_url
            .and_then(non_empty)
            .or_else(|| lookup(BASE_URL_ENV_VAR).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self { token, base_url })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub(crate) fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Build a client, consulting the environment for any value not given.
pub fn yupdates_client(
    token: Option<String>,
    base_url: Option<String>,
    quiet: bool,
) -> ApiResult<YupdatesClient> {
    yupdates_client_with(token, base_url, quiet, env_lookup)
}

/// [`yupdates_client`] with a caller-supplied variable lookup.
pub fn yupdates_client_with<F>(
    token: Option<String>,
    base_url: Option<String>,
    quiet: bool,
    lookup: F,
) -> ApiResult<YupdatesClient>
where
    F: Fn(&str) -> Option<String>,
{
    let config = ClientConfig::resolve_with(token, base_url, lookup)?;
    Ok(YupdatesClient::new(config.token, config.base_url, quiet))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn token_from_environment_and_default_url() {
        let config = ClientConfig::resolve_with(None, None, env_of(&[(TOKEN_ENV_VAR, "abc")])).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn environment_overrides_default_url() {
        let lookup = env_of(&[(TOKEN_ENV_VAR, "abc"), (BASE_URL_ENV_VAR, "http://localhost:3000")]);
        let config = ClientConfig::resolve_with(None, None, lookup).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn explicit_arguments_win() {
        let lookup = env_of(&[(TOKEN_ENV_VAR, "env-token"), (BASE_URL_ENV_VAR, "http://env")]);
        let config = ClientConfig::resolve_with(
            Some("arg-token".to_string()),
            Some("http://arg".to_string()),
            lookup,
        )
        .unwrap();
        assert_eq!(config.token, "arg-token");
        assert_eq!(config.base_url, "http://arg");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = ClientConfig::resolve_with(None, None, env_of(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().contains(TOKEN_ENV_VAR));
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let err = ClientConfig::resolve_with(Some(" ".to_string()), None, env_of(&[(TOKEN_ENV_VAR, "")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn client_with_lookup_uses_resolved_values() {
        let lookup = env_of(&[(TOKEN_ENV_VAR, "abc"), (BASE_URL_ENV_VAR, "http://localhost:3000")]);
        let client = yupdates_client_with(None, None, true, lookup).unwrap();
        assert_eq!(client.token(), "abc");
        assert_eq!(client.base_url(), "http://localhost:3000/");
        assert!(client.quiet());
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::resolve_with(Some("hunter2".to_string()), None, env_of(&[])).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
