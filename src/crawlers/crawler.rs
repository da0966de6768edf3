use crate::error::RetrieveError;
use crate::results::PageDocument;
use async_trait::async_trait;

/// A strategy for turning a URL into a [`PageDocument`]
///
/// Implementations own whatever resources one call needs and release
/// them before returning, so calls never share state.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Retrieve and extract a single page
    async fn fetch_page(&self, url: &str) -> Result<PageDocument, RetrieveError>;
}
