use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::content::ContentPost;

#[derive(Debug, Error, PartialEq)]
pub enum PublishError {
    #[error("Platform '{0}' is not supported for automatic posting")]
    UnsupportedPlatform(String),
}

/// Posts scheduled content to a social platform, returning the platform's post id.
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    async fn publish(&self, post: &ContentPost) -> Result<String, PublishError>;
}

/// Pretends to post to the platforms that have an integration.
pub struct StubPublisher;

const SUPPORTED_PLATFORMS: &[&str] = &["twitter", "youtube", "reddit"];

#[async_trait]
impl SocialPublisher for StubPublisher {
    async fn publish(&self, post: &ContentPost) -> Result<String, PublishError> {
        let platform = post.platform.trim().to_lowercase();
        if !SUPPORTED_PLATFORMS.contains(&platform.as_str()) {
            return Err(PublishError::UnsupportedPlatform(post.platform.clone()));
        }
        let id = Uuid::new_v4().simple().to_string();
        Ok(format!("{platform}_{}", &id[..12]))
    }
}
