use serde_json::Value;

use crate::rest::{ApiResult, LinkedInClient};

#[derive(Debug, Clone)]
pub struct ProfileService {
    client: LinkedInClient,
}

impl ProfileService {
    pub fn new(client: LinkedInClient) -> Self {
        Self { client }
    }

    /// Profile of the member the credentials belong to, as returned by `/v2/userinfo`.
    pub async fn me(&self) -> ApiResult<Value> {
        self.client.user_info().await
    }
}
