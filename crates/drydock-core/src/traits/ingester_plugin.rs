// # Ingester Plugin Trait
//
// Defines the interface for converting a source-specific document into typed
// design entities.
//
// ## Implementations
//
// - YAML (`drydock/v1` documents): `drydock-ingester-yaml` crate
// - Future: Deckhand-rendered documents, inventory databases
//
// ## Usage
//
// ```rust,ignore
// use drydock_core::traits::{IngesterPlugin, IngestParams};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let plugin = /* IngesterPlugin implementation */;
//
//     let params = IngestParams::from_content(std::fs::read_to_string("site.yaml")?);
//     for entity in plugin.ingest(&params).await? {
//         println!("{:?} {}", entity.kind(), entity.name());
//     }
//
//     Ok(())
// }
// ```

use crate::model::DesignEntity;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

/// Source-specific parameters handed to a plugin
///
/// Plugins read whichever fields they understand. The orchestrator fills in
/// `design_ref` and `content`; direct callers may pass `filenames` instead.
#[derive(Debug, Clone, Default)]
pub struct IngestParams {
    /// The design reference the content was fetched from
    pub design_ref: Option<String>,

    /// Raw document text
    pub content: Option<String>,

    /// Files to read when no content is supplied
    pub filenames: Vec<PathBuf>,

    /// Plugin-specific options
    pub options: HashMap<String, serde_json::Value>,
}

impl IngestParams {
    /// Create parameters carrying document text
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Create parameters naming files to read
    pub fn from_files<I, P>(filenames: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            filenames: filenames.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Record the design reference
    pub fn with_design_ref(mut self, design_ref: impl Into<String>) -> Self {
        self.design_ref = Some(design_ref.into());
        self
    }

    /// Set a plugin-specific option
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Trait for ingestion plugins
///
/// A plugin has exactly two jobs: report a stable, unique name and turn its
/// parameters into entities.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Read the documents named by its parameters
/// - ✅ Parse source-specific formats
/// - ✅ Emit `DesignEntity::Unrecognized` for documents it can't type
///
/// ## Forbidden Capabilities
/// - ❌ Touch the design state (owned by `Ingester`)
/// - ❌ Resolve references or inheritance (owned by the orchestrator)
/// - ❌ Validate design rules (owned by `Validator`)
/// - ❌ Keep state between calls
#[async_trait]
pub trait IngesterPlugin: Send + Sync {
    /// Unique, stable plugin name used for registration and lookup
    fn name(&self) -> &str;

    /// Produce design entities from the given parameters
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DesignEntity>)`: Entities in document order
    /// - `Err(Error)`: Unreadable or malformed source
    async fn ingest(&self, params: &IngestParams) -> Result<Vec<DesignEntity>, crate::Error>;
}

/// Zero-argument constructor for an ingestion plugin
pub trait IngesterPluginFactory: Send + Sync {
    /// Create a plugin instance
    fn create(&self) -> Result<Box<dyn IngesterPlugin>, crate::Error>;

    /// Human-readable factory label for logging
    fn describe(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> IngesterPluginFactory for F
where
    F: Fn() -> Result<Box<dyn IngesterPlugin>, crate::Error> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn IngesterPlugin>, crate::Error> {
        self()
    }
}
