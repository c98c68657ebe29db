use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VISIBILITY_PUBLIC: &str = "PUBLIC";
pub const VISIBILITY_CONNECTIONS: &str = "CONNECTIONS";

pub const LIFECYCLE_PUBLISHED: &str = "PUBLISHED";
pub const LIFECYCLE_DRAFT: &str = "DRAFT";
pub const LIFECYCLE_PUBLISH_REQUESTED: &str = "PUBLISH_REQUESTED";
pub const LIFECYCLE_PUBLISH_FAILED: &str = "PUBLISH_FAILED";

pub const MAIN_FEED: &str = "MAIN_FEED";

/// Body of `POST /rest/posts`.
///
/// `visibility` and `lifecycle_state` are sent as given; LinkedIn rejects
/// unknown values itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub author: String,
    pub commentary: String,
    pub visibility: String,
    pub distribution: Distribution,
    pub lifecycle_state: String,
    pub is_reshare_disabled_by_author: bool,
}

impl PostRequest {
    /// A public, published, reshareable post on the main feed.
    pub fn new(author: impl Into<String>, commentary: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            commentary: commentary.into(),
            visibility: VISIBILITY_PUBLIC.to_owned(),
            distribution: Distribution::default(),
            lifecycle_state: LIFECYCLE_PUBLISHED.to_owned(),
            is_reshare_disabled_by_author: false,
        }
    }
}

/// Feed placement and syndication settings of a post. Whatever object the
/// caller supplies is sent unchanged; only the default is built here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(pub Map<String, Value>);

impl Default for Distribution {
    /// Main feed, no target entities, no third-party channels.
    fn default() -> Self {
        let mut settings = Map::new();
        settings.insert("feedDistribution".into(), Value::String(MAIN_FEED.to_owned()));
        settings.insert("targetEntities".into(), Value::Array(Vec::new()));
        settings.insert("thirdPartyDistributionChannels".into(), Value::Array(Vec::new()));
        Self(settings)
    }
}

impl From<Map<String, Value>> for Distribution {
    fn from(settings: Map<String, Value>) -> Self {
        Self(settings)
    }
}

/// Body of a partial update: `{"patch": {"$set": {..}, "adContext"?: {"$set": {..}}}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPatchRequest {
    pub patch: Map<String, Value>,
}

impl PostPatchRequest {
    /// Patch whose `$set` holds exactly the given wire fields.
    pub fn from_set<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        let set: Map<String, Value> = fields
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        let mut patch = Map::new();
        patch.insert("$set".into(), Value::Object(set));
        Self { patch }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPost {
    pub post_urn: String,
    pub post_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostAction {
    Deleted,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatus {
    pub status: PostAction,
    pub post_urn: String,
}

/// Result of a delete or update: the normalized status for `204 No Content`,
/// otherwise whatever JSON the API sent back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MutationOutcome {
    Applied(PostStatus),
    Response(Value),
}

impl MutationOutcome {
    pub(crate) fn applied(action: PostAction, post_urn: &str) -> Self {
        MutationOutcome::Applied(PostStatus {
            status: action,
            post_urn: post_urn.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_distribution_matches_main_feed_shape() {
        assert_eq!(
            serde_json::to_value(Distribution::default()).unwrap(),
            json!({
                "feedDistribution": "MAIN_FEED",
                "targetEntities": [],
                "thirdPartyDistributionChannels": []
            })
        );
    }

    #[test]
    fn distribution_is_carried_verbatim() {
        for raw in [
            json!({ "feedDistribution": "NONE" }),
            json!({ "targetEntities": [] }),
            json!({
                "feedDistribution": "MAIN_FEED",
                "targetEntities": [{ "geoLocations": ["urn:li:geo:103644278"] }],
                "someFutureFlag": true
            }),
        ] {
            let parsed: Distribution = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
        }
    }

    #[test]
    fn distribution_must_be_an_object() {
        assert!(serde_json::from_value::<Distribution>(json!("MAIN_FEED")).is_err());
    }

    #[test]
    fn post_request_uses_camel_case_wire_names() {
        let body = serde_json::to_value(PostRequest::new("urn:li:person:abc123", "Hello #world"))
            .unwrap();
        assert_eq!(body["lifecycleState"], "PUBLISHED");
        assert_eq!(body["isReshareDisabledByAuthor"], false);
        assert_eq!(body["visibility"], "PUBLIC");
        assert_eq!(body.as_object().unwrap().len(), 6);
    }
}
