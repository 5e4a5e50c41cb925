// # Design Source Trait
//
// Defines how the document behind a design reference is fetched. The scheme
// of the reference URI selects the source.
//
// ## Implementations
//
// - `file`: [`crate::source::FileSource`]

use async_trait::async_trait;
use url::Url;

/// Trait for fetching design documents
#[async_trait]
pub trait DesignSource: Send + Sync {
    /// URI scheme handled by this source (e.g. "file")
    fn scheme(&self) -> &str;

    /// Fetch the document text behind `design_ref`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Raw document text
    /// - `Err(Error)`: Unreachable or unreadable document
    async fn fetch(&self, design_ref: &Url) -> Result<String, crate::Error>;
}
