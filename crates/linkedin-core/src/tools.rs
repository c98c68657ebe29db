//! Exposes the post and profile operations as named tools taking and returning JSON,
//! for hosts that dispatch calls by name (agent runtimes, MCP servers, the CLI).

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rest::{
    ApiError, Distribution, ErrorKind, LinkedInClient, LIFECYCLE_PUBLISHED, VISIBILITY_PUBLIC,
};
use crate::services::{CreatePostOptions, PostService, PostUpdateOptions, ProfileService};

/// Errors surfaced while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: ToolName,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to serialize tool result: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. } => {
                ErrorKind::Validation
            }
            ToolError::Api(err) => err.kind(),
            ToolError::Serialize(_) => ErrorKind::Protocol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    CreatePost,
    GetYourInfo,
    DeletePost,
    UpdatePost,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::CreatePost,
        ToolName::GetYourInfo,
        ToolName::DeletePost,
        ToolName::UpdatePost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::CreatePost => "create_post",
            ToolName::GetYourInfo => "get_your_info",
            ToolName::DeletePost => "delete_post",
            ToolName::UpdatePost => "update_post",
        }
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            ToolName::CreatePost => ToolDefinition {
                name: self.as_str(),
                description: "Create a post on LinkedIn. Returns the post URN and its feed URL. \
                    Requires w_member_social (member posts) or w_organization_social \
                    (company page posts).",
                tags: &["posts", "important"],
                parameters: vec![
                    ToolParameter::required(
                        "commentary",
                        "string",
                        "Post text. Mentions use \"@[Entity Name](urn:li:organization:123456)\" \
                         and must match the entity name exactly; hashtags use \"#keyword\".",
                    ),
                    ToolParameter::required(
                        "author",
                        "string",
                        "URN of the author: \"urn:li:person:{id}\" for a member or \
                         \"urn:li:organization:{id}\" for a company page.",
                    ),
                    ToolParameter::optional(
                        "visibility",
                        "string",
                        Value::from(VISIBILITY_PUBLIC),
                        "\"PUBLIC\" for anyone on LinkedIn or \"CONNECTIONS\" for \
                         1st-degree connections only.",
                    ),
                    ToolParameter::optional(
                        "distribution",
                        "object",
                        Value::Object(Distribution::default().0),
                        "Distribution settings sent as given: feedDistribution, \
                         targetEntities and thirdPartyDistributionChannels.",
                    ),
                    ToolParameter::optional(
                        "lifecycle_state",
                        "string",
                        Value::from(LIFECYCLE_PUBLISHED),
                        "\"PUBLISHED\", \"DRAFT\", \"PUBLISH_REQUESTED\" or \"PUBLISH_FAILED\".",
                    ),
                    ToolParameter::optional(
                        "is_reshare_disabled",
                        "boolean",
                        Value::Bool(false),
                        "Prevent other members from resharing the post.",
                    ),
                ],
            },
            ToolName::GetYourInfo => ToolDefinition {
                name: self.as_str(),
                description: "Get the LinkedIn profile information of the authenticated member.",
                tags: &["profile", "info"],
                parameters: Vec::new(),
            },
            ToolName::DeletePost => ToolDefinition {
                name: self.as_str(),
                description: "Delete a post on LinkedIn. Returns {\"status\": \"deleted\", \"post_urn\"}.",
                tags: &["posts", "important"],
                parameters: vec![post_urn_parameter()],
            },
            ToolName::UpdatePost => ToolDefinition {
                name: self.as_str(),
                description: "Update a post on LinkedIn. Only the supplied fields change. \
                    Returns {\"status\": \"updated\", \"post_urn\"}.",
                tags: &["posts", "update", "important"],
                parameters: vec![
                    post_urn_parameter(),
                    ToolParameter::optional_string(
                        "commentary",
                        "New post text, in little text format.",
                    ),
                    ToolParameter::optional_string(
                        "content_call_to_action_label",
                        "Call to action label that opens the landing page.",
                    ),
                    ToolParameter::optional_string(
                        "content_landing_page",
                        "URL of the landing page.",
                    ),
                    ToolParameter::optional_string(
                        "lifecycle_state",
                        "\"DRAFT\", \"PUBLISHED\", \"PUBLISH_REQUESTED\" or \"PUBLISH_FAILED\".",
                    ),
                    ToolParameter::optional_string(
                        "ad_context_name",
                        "New name of the sponsored content.",
                    ),
                    ToolParameter::optional_string(
                        "ad_context_status",
                        "New status of the sponsored content.",
                    ),
                ],
            },
        }
    }
}

fn post_urn_parameter() -> ToolParameter {
    ToolParameter::required(
        "post_urn",
        "string",
        "URN of the post: \"urn:li:share:{id}\" or \"urn:li:ugcPost:{id}\".",
    )
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_owned()))
    }
}

/// What a host shows to callers when enumerating tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub parameters: Vec<ToolParameter>,
}

/// One named argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolParameter {
    pub name: &'static str,
    /// JSON type of the value: `string`, `boolean` or `object`.
    #[serde(rename = "type")]
    pub json_type: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ToolParameter {
    fn required(name: &'static str, json_type: &'static str, description: &'static str) -> Self {
        Self {
            name,
            json_type,
            required: true,
            default: None,
            description,
        }
    }

    fn optional(
        name: &'static str,
        json_type: &'static str,
        default: Value,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            json_type,
            required: false,
            default: Some(default),
            description,
        }
    }

    fn optional_string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            json_type: "string",
            required: false,
            default: None,
            description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeletePostArgs {
    post_urn: String,
}

#[derive(Debug, Deserialize)]
struct UpdatePostArgs {
    post_urn: String,
    #[serde(flatten)]
    options: PostUpdateOptions,
}

/// The LinkedIn tool set bound to one client.
#[derive(Debug, Clone)]
pub struct LinkedInTools {
    posts: PostService,
    profile: ProfileService,
}

impl LinkedInTools {
    pub fn new(client: LinkedInClient) -> Self {
        Self {
            posts: PostService::new(client.clone()),
            profile: ProfileService::new(client),
        }
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        ToolName::ALL.into_iter().map(ToolName::definition).collect()
    }

    /// Run the tool called `name` with JSON `arguments` (an object keyed by
    /// snake_case parameter names, or `null` for tools without parameters).
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool: ToolName = name.parse()?;
        log::debug!("dispatching tool {tool}");

        match tool {
            ToolName::CreatePost => {
                let options: CreatePostOptions = parse_args(tool, arguments)?;
                to_json(self.posts.create(options).await?)
            }
            ToolName::GetYourInfo => Ok(self.profile.me().await?),
            ToolName::DeletePost => {
                let args: DeletePostArgs = parse_args(tool, arguments)?;
                to_json(self.posts.delete(&args.post_urn).await?)
            }
            ToolName::UpdatePost => {
                let args: UpdatePostArgs = parse_args(tool, arguments)?;
                to_json(self.posts.update(&args.post_urn, args.options).await?)
            }
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|source| ToolError::InvalidArguments { tool, source })
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(ToolError::Serialize)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{CredentialSource, StaticCredentials};
    use crate::config::ClientConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn tools_for(server: &MockServer) -> LinkedInTools {
        let client = LinkedInClient::new(
            ClientConfig::with_base_url(server.base_url()),
            Arc::new(StaticCredentials::new(CredentialSource::bearer("tok"))),
        )
        .unwrap();
        LinkedInTools::new(client)
    }

    #[test]
    fn lists_four_tools_in_order() {
        let client = LinkedInClient::without_credentials(ClientConfig::default()).unwrap();
        let names: Vec<_> = LinkedInTools::new(client)
            .list_tools()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(
            names,
            ["create_post", "get_your_info", "delete_post", "update_post"]
        );
    }

    #[test]
    fn tool_names_parse_back() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert!(matches!(
            "share_post".parse::<ToolName>(),
            Err(ToolError::UnknownTool(_))
        ));
    }

    #[test]
    fn update_post_documents_every_argument() {
        let definition = ToolName::UpdatePost.definition();
        let required: Vec<_> = definition
            .parameters
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();
        let optional: Vec<_> = definition
            .parameters
            .iter()
            .filter(|param| !param.required)
            .map(|param| param.name)
            .collect();

        assert_eq!(required, ["post_urn"]);
        assert_eq!(
            optional,
            [
                "commentary",
                "content_call_to_action_label",
                "content_landing_page",
                "lifecycle_state",
                "ad_context_name",
                "ad_context_status"
            ]
        );
        assert!(definition
            .parameters
            .iter()
            .all(|param| param.json_type == "string" && param.default.is_none()));
    }

    #[test]
    fn create_post_listing_shows_types_and_defaults() {
        let listing = serde_json::to_value(ToolName::CreatePost.definition()).unwrap();
        let params = listing["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 6);

        let find = |name: &str| {
            params
                .iter()
                .find(|param| param["name"] == name)
                .cloned()
                .unwrap()
        };
        assert_eq!(find("author")["required"], true);
        assert!(find("author").get("default").is_none());
        assert_eq!(find("visibility")["default"], "PUBLIC");
        assert_eq!(find("lifecycle_state")["default"], "PUBLISHED");
        assert_eq!(find("is_reshare_disabled")["type"], "boolean");
        assert_eq!(find("is_reshare_disabled")["default"], false);
        assert_eq!(find("distribution")["default"]["feedDistribution"], "MAIN_FEED");
        assert!(find("commentary")["description"]
            .as_str()
            .unwrap()
            .contains("urn:li:organization"));
    }

    #[test]
    fn get_your_info_takes_no_arguments() {
        assert!(ToolName::GetYourInfo.definition().parameters.is_empty());
    }

    #[tokio::test]
    async fn create_post_tool_sends_caller_distribution_unchanged() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/rest/posts").json_body(json!({
                "author": "urn:li:person:abc123",
                "commentary": "Hello",
                "visibility": "PUBLIC",
                "distribution": { "targetEntities": [] },
                "lifecycleState": "PUBLISHED",
                "isReshareDisabledByAuthor": false
            }));
            then.status(201).header("x-restli-id", "urn:li:share:1000");
        });

        let result = tools_for(&server)
            .call(
                "create_post",
                json!({
                    "commentary": "Hello",
                    "author": "urn:li:person:abc123",
                    "distribution": { "targetEntities": [] }
                }),
            )
            .await
            .unwrap();
        mock.assert();
        assert_eq!(result["post_urn"], "urn:li:share:1000");
    }

    #[tokio::test]
    async fn create_post_tool_applies_defaults() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/rest/posts").json_body(json!({
                "author": "urn:li:person:abc123",
                "commentary": "Hello #world",
                "visibility": "PUBLIC",
                "distribution": {
                    "feedDistribution": "MAIN_FEED",
                    "targetEntities": [],
                    "thirdPartyDistributionChannels": []
                },
                "lifecycleState": "PUBLISHED",
                "isReshareDisabledByAuthor": false
            }));
            then.status(201).header("x-restli-id", "urn:li:share:999");
        });

        let result = tools_for(&server)
            .call(
                "create_post",
                json!({ "commentary": "Hello #world", "author": "urn:li:person:abc123" }),
            )
            .await
            .unwrap();
        mock.assert();
        assert_eq!(
            result,
            json!({
                "post_urn": "urn:li:share:999",
                "post_url": "https://www.linkedin.com/feed/update/urn:li:share:999"
            })
        );
    }

    #[tokio::test]
    async fn update_post_tool_sends_only_supplied_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path_includes("555").json_body(json!({
                "patch": {
                    "$set": {},
                    "adContext": { "$set": { "dscStatus": "ARCHIVED" } }
                }
            }));
            then.status(204);
        });

        let result = tools_for(&server)
            .call(
                "update_post",
                json!({ "post_urn": "urn:li:share:555", "ad_context_status": "ARCHIVED" }),
            )
            .await
            .unwrap();
        mock.assert();
        assert_eq!(
            result,
            json!({ "status": "updated", "post_urn": "urn:li:share:555" })
        );
    }

    #[tokio::test]
    async fn get_your_info_accepts_null_arguments() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/userinfo");
            then.status(200).json_body(json!({ "sub": "abc123" }));
        });

        let result = tools_for(&server)
            .call("get_your_info", Value::Null)
            .await
            .unwrap();
        assert_eq!(result, json!({ "sub": "abc123" }));
    }

    #[tokio::test]
    async fn missing_post_urn_is_invalid_arguments() {
        let server = MockServer::start();
        let err = tools_for(&server)
            .call("delete_post", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments {
                tool: ToolName::DeletePost,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn api_failures_keep_their_kind() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path_includes("403");
            then.status(403).body("forbidden");
        });

        let err = tools_for(&server)
            .call("delete_post", json!({ "post_urn": "urn:li:share:403" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
