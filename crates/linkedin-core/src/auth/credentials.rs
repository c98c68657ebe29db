use std::collections::BTreeMap;
use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AuthError, CredentialStore};

const ACCESS_TOKEN_ENV: &str = "LINKEDIN_ACCESS_TOKEN";
const HEADERS_ENV: &str = "LINKEDIN_HEADERS";

/// What a credential provider hands back for a single outbound call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// OAuth access token sent as `Authorization: Bearer <token>`.
    BearerToken(String),
    /// A complete header set supplied by the integration. Used as-is.
    PrebuiltHeaders(BTreeMap<String, String>),
}

impl CredentialSource {
    pub fn bearer(token: impl Into<String>) -> Self {
        CredentialSource::BearerToken(token.into())
    }

    pub fn headers<K, V>(headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        CredentialSource::PrebuiltHeaders(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Short human readable label; never includes secret material.
    pub fn describe(&self) -> String {
        match self {
            CredentialSource::BearerToken(_) => "bearer token".to_owned(),
            CredentialSource::PrebuiltHeaders(headers) => {
                format!("pre-built header set ({} headers)", headers.len())
            }
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            CredentialSource::PrebuiltHeaders(headers) => f
                .debug_tuple("PrebuiltHeaders")
                .field(&headers.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Source of credentials consulted on every request. Implementations may
/// refresh their state between calls; the client never caches the result.
///
/// `credentials` runs synchronously inside the client's async request path,
/// once per request, on whatever executor thread is polling it. Keep it cheap
/// and non-blocking: return state that is already in memory, or at most read a
/// small local file. A provider that has to hit the network or wait on a lock
/// held across I/O should fetch ahead of time and hand out the cached result.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<CredentialSource, AuthError>;
}

/// Always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    source: CredentialSource,
}

impl StaticCredentials {
    pub fn new(source: CredentialSource) -> Self {
        Self { source }
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<CredentialSource, AuthError> {
        Ok(self.source.clone())
    }
}

/// Reads `LINKEDIN_HEADERS` (a JSON object) or `LINKEDIN_ACCESS_TOKEN` from
/// the process environment on every call. The header set wins when both exist.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn new() -> Self {
        Self
    }

    /// Whether either supported variable is currently set.
    pub fn is_configured() -> bool {
        env::var_os(HEADERS_ENV).is_some() || env::var_os(ACCESS_TOKEN_ENV).is_some()
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<CredentialSource, AuthError> {
        resolve_env(|key| env::var(key).ok())
    }
}

fn resolve_env(lookup: impl Fn(&str) -> Option<String>) -> Result<CredentialSource, AuthError> {
    if let Some(raw) = lookup(HEADERS_ENV) {
        let headers: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|_| AuthError::InvalidHeaderSet(HEADERS_ENV))?;
        return Ok(CredentialSource::PrebuiltHeaders(headers));
    }

    match lookup(ACCESS_TOKEN_ENV) {
        Some(token) if token.trim().is_empty() => Err(AuthError::EmptyToken),
        Some(token) => Ok(CredentialSource::BearerToken(token.trim().to_owned())),
        None => Err(AuthError::MissingEnvironment(ACCESS_TOKEN_ENV)),
    }
}

/// Loads a named profile from a [`CredentialStore`] each time credentials are requested.
pub struct StoredCredentials<S> {
    store: S,
    profile: String,
}

impl<S: CredentialStore> StoredCredentials<S> {
    pub fn new(store: S, profile: impl Into<String>) -> Self {
        Self {
            store,
            profile: profile.into(),
        }
    }
}

impl<S> CredentialProvider for StoredCredentials<S>
where
    S: CredentialStore + Send + Sync,
{
    fn credentials(&self) -> Result<CredentialSource, AuthError> {
        self.store
            .load(&self.profile)?
            .map(|stored| stored.source)
            .ok_or_else(|| AuthError::MissingProfile(self.profile.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn env_prefers_header_set() {
        let source = resolve_env(lookup(&[
            ("LINKEDIN_HEADERS", r#"{"Authorization":"Bearer x"}"#),
            ("LINKEDIN_ACCESS_TOKEN", "ignored"),
        ]))
        .unwrap();
        assert_eq!(
            source,
            CredentialSource::headers([("Authorization", "Bearer x")])
        );
    }

    #[test]
    fn env_falls_back_to_token() {
        let source = resolve_env(lookup(&[("LINKEDIN_ACCESS_TOKEN", " tok \n")])).unwrap();
        assert_eq!(source, CredentialSource::bearer("tok"));
    }

    #[test]
    fn env_rejects_malformed_headers() {
        let err = resolve_env(lookup(&[("LINKEDIN_HEADERS", "[1, 2]")])).unwrap_err();
        assert!(matches!(err, AuthError::InvalidHeaderSet("LINKEDIN_HEADERS")));
    }

    #[test]
    fn env_without_variables_fails() {
        let err = resolve_env(lookup(&[])).unwrap_err();
        assert!(matches!(err, AuthError::MissingEnvironment(_)));
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", CredentialSource::bearer("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
