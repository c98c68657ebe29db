use serde::Deserialize;
use serde_json::{Map, Value};

use crate::rest::{
    ApiResult, CreatedPost, Distribution, LinkedInClient, MutationOutcome, PostPatchRequest,
    PostRequest, LIFECYCLE_PUBLISHED, VISIBILITY_PUBLIC,
};

/// Create, update and delete posts on behalf of the authenticated member or organization.
#[derive(Debug, Clone)]
pub struct PostService {
    client: LinkedInClient,
}

impl PostService {
    pub fn new(client: LinkedInClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, options: CreatePostOptions) -> ApiResult<CreatedPost> {
        self.client.create_post(&options.into_request()).await
    }

    pub async fn update(
        &self,
        post_urn: &str,
        options: PostUpdateOptions,
    ) -> ApiResult<MutationOutcome> {
        self.client
            .update_post(post_urn, &options.into_patch())
            .await
    }

    pub async fn delete(&self, post_urn: &str) -> ApiResult<MutationOutcome> {
        self.client.delete_post(post_urn).await
    }
}

fn default_visibility() -> String {
    VISIBILITY_PUBLIC.to_owned()
}

fn default_lifecycle_state() -> String {
    LIFECYCLE_PUBLISHED.to_owned()
}

/// Inputs for a new post. `commentary` supports `@[Name](urn:li:organization:123)`
/// mentions and `#hashtags`; both are sent through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostOptions {
    pub commentary: String,
    /// `urn:li:person:{id}` or `urn:li:organization:{id}`.
    pub author: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default)]
    pub distribution: Option<Distribution>,
    #[serde(default = "default_lifecycle_state")]
    pub lifecycle_state: String,
    #[serde(default)]
    pub is_reshare_disabled: bool,
}

impl CreatePostOptions {
    pub fn new(author: impl Into<String>, commentary: impl Into<String>) -> Self {
        Self {
            commentary: commentary.into(),
            author: author.into(),
            visibility: default_visibility(),
            distribution: None,
            lifecycle_state: default_lifecycle_state(),
            is_reshare_disabled: false,
        }
    }

    fn into_request(self) -> PostRequest {
        PostRequest {
            author: self.author,
            commentary: self.commentary,
            visibility: self.visibility,
            distribution: self.distribution.unwrap_or_default(),
            lifecycle_state: self.lifecycle_state,
            is_reshare_disabled_by_author: self.is_reshare_disabled,
        }
    }
}

/// Fields a caller may change on an existing post. Only the fields that are
/// `Some` end up in the patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdateOptions {
    pub commentary: Option<String>,
    pub content_call_to_action_label: Option<String>,
    pub content_landing_page: Option<String>,
    pub lifecycle_state: Option<String>,
    /// Name of the sponsored content.
    pub ad_context_name: Option<String>,
    /// Status of the sponsored content.
    pub ad_context_status: Option<String>,
}

impl PostUpdateOptions {
    fn into_patch(self) -> PostPatchRequest {
        let mut set = Map::new();

        if let Some(commentary) = self.commentary {
            set.insert("commentary".into(), Value::String(commentary));
        }

        if let Some(label) = self.content_call_to_action_label {
            set.insert("contentCallToActionLabel".into(), Value::String(label));
        }

        if let Some(landing_page) = self.content_landing_page {
            set.insert("contentLandingPage".into(), Value::String(landing_page));
        }

        if let Some(lifecycle_state) = self.lifecycle_state {
            set.insert("lifecycleState".into(), Value::String(lifecycle_state));
        }

        let mut patch = Map::new();
        patch.insert("$set".into(), Value::Object(set));

        if self.ad_context_name.is_some() || self.ad_context_status.is_some() {
            let mut ad_set = Map::new();
            if let Some(name) = self.ad_context_name {
                ad_set.insert("dscName".into(), Value::String(name));
            }
            if let Some(status) = self.ad_context_status {
                ad_set.insert("dscStatus".into(), Value::String(status));
            }

            let mut ad_context = Map::new();
            ad_context.insert("$set".into(), Value::Object(ad_set));
            patch.insert("adContext".into(), Value::Object(ad_context));
        }

        PostPatchRequest { patch }
    }
}
