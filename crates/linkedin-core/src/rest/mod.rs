mod client;
mod types;

pub use client::{ApiError, ApiResult, ErrorKind, LinkedInClient};
pub use types::{
    CreatedPost, Distribution, MutationOutcome, PostAction, PostPatchRequest, PostRequest,
    PostStatus, LIFECYCLE_DRAFT, LIFECYCLE_PUBLISHED, LIFECYCLE_PUBLISH_FAILED,
    LIFECYCLE_PUBLISH_REQUESTED, MAIN_FEED, VISIBILITY_CONNECTIONS, VISIBILITY_PUBLIC,
};
