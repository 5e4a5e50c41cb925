//! Design reference sources
//!
//! A design reference is a URI; its scheme picks the [`DesignSource`] that
//! fetches the document. Sources are registered by scheme, the same way
//! plugins are registered by name.

pub mod file;

pub use file::FileSource;

use crate::error::{Error, Result};
use crate::traits::DesignSource;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;

/// Registry of design sources keyed by URI scheme
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent fetches, exclusive registration.
#[derive(Default)]
pub struct SourceRegistry {
    sources: RwLock<HashMap<String, Arc<dyn DesignSource>>>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `file` source
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_source(Arc::new(FileSource::new()));
        registry
    }

    /// Register a source under the scheme it reports, replacing any previous one
    pub fn register_source(&self, source: Arc<dyn DesignSource>) {
        let scheme = source.scheme().to_ascii_lowercase();
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        sources.insert(scheme, source);
    }

    /// Check if a scheme is supported
    pub fn has_scheme(&self, scheme: &str) -> bool {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.contains_key(&scheme.to_ascii_lowercase())
    }

    /// List all supported schemes, sorted
    pub fn list_schemes(&self) -> Vec<String> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        let mut schemes: Vec<String> = sources.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Fetch the document behind a design reference
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Document text
    /// - `Err(Error::Config)`: Unparseable reference or unsupported scheme
    /// - `Err(Error)`: Whatever the source reports
    pub async fn fetch(&self, design_ref: &str) -> Result<String> {
        let url = Url::parse(design_ref)
            .map_err(|e| Error::config(format!("Invalid design reference '{}': {}", design_ref, e)))?;

        let source = {
            let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
            sources.get(url.scheme()).cloned().ok_or_else(|| {
                Error::config(format!(
                    "Unsupported design reference scheme '{}' in {}",
                    url.scheme(),
                    design_ref
                ))
            })?
        };

        source.fetch(&url).await
    }
}
