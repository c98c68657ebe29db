pub mod posts;
pub mod profile;

pub use posts::{CreatePostOptions, PostService, PostUpdateOptions};
pub use profile::ProfileService;
