//! Core traits for the drydock core
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IngesterPlugin`]: Turn source documents into design entities
//! - [`DesignSource`]: Fetch the document behind a design reference

pub mod design_source;
pub mod ingester_plugin;

pub use design_source::DesignSource;
pub use ingester_plugin::{IngestParams, IngesterPlugin, IngesterPluginFactory};
