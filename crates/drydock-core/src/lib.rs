// # drydock-core
//
// Core library for site design ingestion, resolution and validation.
//
// ## Architecture Overview
//
// - **IngesterPlugin**: Trait for turning a design source into typed entities
// - **Ingester**: Plugin registry routing entities into a design state
// - **DesignState**: Accumulator of entities keyed by (kind, name)
// - **Orchestrator**: Fetches design references and resolves the effective site
// - **Validator**: Named rules producing validation messages over a site design
//
// ## Design Principles
//
// 1. **Plugin-Based**: Ingestion formats are registered by name, never hard-coded
// 2. **Library-First**: The CLI is a thin shell over this crate
// 3. **Immutable Results**: A resolved `SiteDesign` is frozen; rules only read it
// 4. **Findings Are Values**: Validation never fails, it reports messages

pub mod config;
pub mod error;
pub mod ingester;
pub mod model;
pub mod orchestrator;
pub mod source;
pub mod state;
pub mod traits;
pub mod validator;

// Re-export core types for convenience
pub use config::{DrydockConfig, IngesterConfig, OrchestratorConfig, UnrecognizedPolicy, ValidatorConfig};
pub use error::{Error, Result};
pub use ingester::{IngestSummary, Ingester};
pub use orchestrator::{Orchestrator, ResolutionIssue, ResolutionStatus, SiteDesign};
pub use state::DesignState;
pub use traits::{IngestParams, IngesterPlugin, IngesterPluginFactory};
pub use validator::{ValidationMessage, ValidationRule, Validator};
