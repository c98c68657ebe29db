use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::auth::{AuthError, CredentialProvider, CredentialSource};
use crate::config::ClientConfig;

use super::types::{CreatedPost, MutationOutcome, PostAction, PostPatchRequest, PostRequest};

const POSTS_PATH: &str = "/rest/posts";
const USER_INFO_PATH: &str = "/v2/userinfo";
const RESTLI_ID_HEADER: &str = "x-restli-id";
const PROTOCOL_VERSION_HEADER: &str = "x-restli-protocol-version";
const API_VERSION_HEADER: &str = "linkedin-version";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Characters left as-is when a URN is placed in a path segment; everything
/// else, `:` and `/` included, is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Broad category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials or client settings are missing or unusable.
    Configuration,
    /// An input or a required response field is missing.
    Validation,
    /// The API answered with a failure status or an unreadable body.
    Protocol,
    /// The request never completed.
    Transport,
}

/// Errors returned by the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("integration not found: no credential provider attached")]
    MissingIntegration,
    #[error("credential lookup failed: {0}")]
    Credentials(#[from] AuthError),
    #[error("invalid header '{name}' in credentials")]
    InvalidHeader { name: String },
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("{0} header not found in response")]
    MissingResponseHeader(&'static str),
    #[error("HTTP status {status} body: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingIntegration
            | ApiError::Credentials(_)
            | ApiError::InvalidHeader { .. }
            | ApiError::InvalidUrl(_) => ErrorKind::Configuration,
            ApiError::MissingField(_) | ApiError::MissingResponseHeader(_) => {
                ErrorKind::Validation
            }
            ApiError::HttpStatus { .. } | ApiError::Deserialize(_) => ErrorKind::Protocol,
            ApiError::Http(_) => ErrorKind::Transport,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Minimal REST client for the LinkedIn posts and userinfo endpoints.
#[derive(Clone)]
pub struct LinkedInClient {
    http: Client,
    config: ClientConfig,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl fmt::Debug for LinkedInClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInClient")
            .field("config", &self.config)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

impl LinkedInClient {
    /// Build a client that asks `credentials` for auth material on every request.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialProvider>) -> ApiResult<Self> {
        let mut client = Self::without_credentials(config)?;
        client.credentials = Some(credentials);
        Ok(client)
    }

    /// Build a client with no credential provider. Every call fails with
    /// [`ApiError::MissingIntegration`] until one is attached.
    pub fn without_credentials(config: ClientConfig) -> ApiResult<Self> {
        Url::parse(&config.base_url)?;
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self {
            http,
            config,
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Header set for the next outbound call.
    ///
    /// A pre-built header set from the provider is returned verbatim; a bearer
    /// token expands to exactly four headers: authorization, protocol version,
    /// content type and API version.
    pub fn headers(&self) -> ApiResult<HeaderMap> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or(ApiError::MissingIntegration)?;

        match provider.credentials()? {
            CredentialSource::PrebuiltHeaders(headers) => headers
                .iter()
                .map(|(name, value)| -> ApiResult<(HeaderName, HeaderValue)> {
                    let header =
                        HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header(name))?;
                    Ok((header, header_value(name, value)?))
                })
                .collect(),
            CredentialSource::BearerToken(token) => {
                let mut authorization = header_value("Authorization", &format!("Bearer {token}"))?;
                authorization.set_sensitive(true);

                let mut headers = HeaderMap::with_capacity(4);
                headers.insert(AUTHORIZATION, authorization);
                headers.insert(
                    HeaderName::from_static(PROTOCOL_VERSION_HEADER),
                    header_value(PROTOCOL_VERSION_HEADER, &self.config.protocol_version)?,
                );
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                headers.insert(
                    HeaderName::from_static(API_VERSION_HEADER),
                    header_value(API_VERSION_HEADER, &self.config.api_version)?,
                );
                Ok(headers)
            }
        }
    }

    /// Create a post and return its URN together with its public feed URL.
    pub async fn create_post(&self, request: &PostRequest) -> ApiResult<CreatedPost> {
        require("author", &request.author)?;
        require("commentary", &request.commentary)?;

        let response = self.send(Method::POST, POSTS_PATH, Some(request)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let post_urn = response
            .headers()
            .get(RESTLI_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::MissingResponseHeader(RESTLI_ID_HEADER))?
            .to_owned();

        log::debug!("created post {post_urn}");
        let post_url = format!("{}{}", self.config.feed_url_prefix, post_urn);
        Ok(CreatedPost { post_urn, post_url })
    }

    /// Fetch the OpenID userinfo document for the authenticated member, unmodified.
    pub async fn user_info(&self) -> ApiResult<Value> {
        let response = self.send::<()>(Method::GET, USER_INFO_PATH, None).await?;
        decode(response).await
    }

    pub async fn delete_post(&self, post_urn: &str) -> ApiResult<MutationOutcome> {
        require("post_urn", post_urn)?;
        let response = self
            .send::<()>(Method::DELETE, &post_path(post_urn), None)
            .await?;
        mutation_outcome(response, PostAction::Deleted, post_urn).await
    }

    /// Apply a partial update. LinkedIn takes patches as a POST to the entity path.
    pub async fn update_post(
        &self,
        post_urn: &str,
        patch: &PostPatchRequest,
    ) -> ApiResult<MutationOutcome> {
        require("post_urn", post_urn)?;
        let response = self
            .send(Method::POST, &post_path(post_urn), Some(patch))
            .await?;
        mutation_outcome(response, PostAction::Updated, post_urn).await
    }

    async fn send<T>(&self, method: Method, path: &str, body: Option<&T>) -> ApiResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let headers = self.headers()?;

        log::debug!("{method} {path}");
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        log::debug!("{path} answered {}", response.status());
        Ok(response)
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }
}

/// Path of a single post, with the URN escaped as one segment.
pub(crate) fn post_path(post_urn: &str) -> String {
    format!(
        "{POSTS_PATH}/{}",
        utf8_percent_encode(post_urn, PATH_SEGMENT)
    )
}

/// Shared response decoder: non-2xx statuses become [`ApiError::HttpStatus`],
/// 2xx bodies are parsed as JSON and an empty body decodes to `null`.
pub(crate) async fn decode(response: Response) -> ApiResult<Value> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

async fn mutation_outcome(
    response: Response,
    action: PostAction,
    post_urn: &str,
) -> ApiResult<MutationOutcome> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(MutationOutcome::applied(action, post_urn));
    }
    decode(response).await.map(MutationOutcome::Response)
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::warn!("LinkedIn API returned {status}");
    ApiError::HttpStatus { status, body }
}

fn require(field: &'static str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingField(field));
    }
    Ok(())
}

fn header_value(name: &str, value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| invalid_header(name))
}

fn invalid_header(name: &str) -> ApiError {
    ApiError::InvalidHeader {
        name: name.to_owned(),
    }
}
