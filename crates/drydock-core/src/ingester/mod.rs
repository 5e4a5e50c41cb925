//! Plugin-based ingester
//!
//! The ingester keeps a registry of ingestion plugins keyed by the name each
//! plugin reports, and routes the entities a plugin produces into a
//! [`DesignState`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drydock_core::{Ingester, DesignState};
//! use drydock_core::traits::IngestParams;
//!
//! let ingester = Ingester::new();
//! ingester.enable_plugins(vec![Box::new(YamlPluginFactory)])?;
//!
//! let mut state = DesignState::new();
//! ingester
//!     .ingest_data("yaml", Some(&mut state), &IngestParams::from_content(text))
//!     .await?;
//! ```
//!
//! ## Fault isolation
//!
//! One bad plugin never blocks the others: a factory that fails to construct,
//! or a plugin reporting a name already taken, is logged and skipped.
//! `enable_plugins` fails only when no plugin at all is registered.

use crate::config::{IngesterConfig, UnrecognizedPolicy};
use crate::error::{Error, Result};
use crate::model::{DesignEntity, EntityKind};
use crate::state::DesignState;
use crate::traits::{IngestParams, IngesterPlugin, IngesterPluginFactory};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{Instrument, Span, debug, error, info, warn};

/// What one `ingest_data` call did to the design state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Plugin that produced the entities
    pub plugin: String,

    /// Entities routed into the state, per kind
    pub accepted: BTreeMap<EntityKind, usize>,

    /// How many of the accepted entities replaced an existing identity
    pub replaced: usize,

    /// Unrecognized entities dropped under the configured policy
    pub dropped: usize,
}

impl IngestSummary {
    fn new(plugin: &str) -> Self {
        Self {
            plugin: plugin.to_string(),
            ..Default::default()
        }
    }

    /// Total entities routed into the state
    pub fn total(&self) -> usize {
        self.accepted.values().sum()
    }

    fn record(&mut self, kind: EntityKind, replaced: bool) {
        *self.accepted.entry(kind).or_insert(0) += 1;
        if replaced {
            self.replaced += 1;
        }
    }
}

/// Ingestion plugin registry and entity router
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// ingestion and serialized registration. Accumulation into a design state
/// is serialized by the `&mut DesignState` borrow.
pub struct Ingester {
    /// Registered plugins by name
    plugins: RwLock<HashMap<String, Arc<dyn IngesterPlugin>>>,

    /// Handling of entities outside the known kinds
    unrecognized: UnrecognizedPolicy,

    /// Observability context for everything this ingester logs
    span: Span,
}

impl Default for Ingester {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingester {
    /// Create an ingester with no plugins and the default policy
    pub fn new() -> Self {
        Self::with_config(&IngesterConfig::default())
    }

    /// Create an ingester from configuration
    pub fn with_config(config: &IngesterConfig) -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            unrecognized: config.unrecognized,
            span: tracing::info_span!("ingester"),
        }
    }

    /// Record under the given span instead of a fresh `ingester` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The configured policy for unrecognized entities
    pub fn unrecognized_policy(&self) -> UnrecognizedPolicy {
        self.unrecognized
    }

    /// Instantiate and register plugins
    ///
    /// Each factory is asked for a plugin, and the plugin for its name.
    /// Construction failures and duplicate names are logged and skipped.
    ///
    /// # Parameters
    ///
    /// - `factories`: Plugin factories; must not be empty
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: Names registered by this call
    /// - `Err(Error::Config)`: Empty factory list, or no plugin registered at all
    pub fn enable_plugins(&self, factories: Vec<Box<dyn IngesterPluginFactory>>) -> Result<Vec<String>> {
        let _entered = self.span.enter();

        if factories.is_empty() {
            error!("Cannot have an empty plugin list");
            return Err(Error::config("Cannot have an empty plugin list"));
        }

        let mut enabled = Vec::new();
        let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);

        for factory in &factories {
            let plugin = match factory.create() {
                Ok(plugin) => plugin,
                Err(e) => {
                    error!("Could not enable plugin {}: {}", factory.describe(), e);
                    continue;
                }
            };

            let name = plugin.name().to_string();
            if name.is_empty() {
                error!("Could not enable plugin {}: empty plugin name", factory.describe());
                continue;
            }
            if plugins.contains_key(&name) {
                warn!("Could not enable plugin {}: name '{}' already registered", factory.describe(), name);
                continue;
            }

            debug!("Enabled ingester plugin {}", name);
            plugins.insert(name.clone(), Arc::from(plugin));
            enabled.push(name);
        }

        if plugins.is_empty() {
            error!("Could not enable at least one plugin");
            return Err(Error::config("Could not enable at least one plugin"));
        }

        info!("Enabled {} of {} ingester plugin(s)", enabled.len(), factories.len());
        Ok(enabled)
    }

    /// Run a plugin and route its entities into a design state
    ///
    /// # Parameters
    ///
    /// - `plugin_name`: Registered plugin to use
    /// - `design_state`: Accumulator to populate; `None` is rejected
    /// - `params`: Passed through to the plugin untouched
    ///
    /// # Returns
    ///
    /// - `Ok(IngestSummary)`: What was added, replaced and dropped
    /// - `Err(Error::InvalidArgument)`: No design state given
    /// - `Err(Error::Lookup)`: Plugin not registered
    /// - `Err(Error::Processing)`: Unrecognized entity under the `reject` policy
    /// - `Err(Error)`: Whatever the plugin reports
    pub async fn ingest_data(
        &self,
        plugin_name: &str,
        design_state: Option<&mut DesignState>,
        params: &IngestParams,
    ) -> Result<IngestSummary> {
        let span = self.span.clone();
        async move {
            let Some(state) = design_state else {
                error!("ingest_data called without valid DesignState handler");
                return Err(Error::invalid_argument("ingest_data called without a valid design state"));
            };

            let plugin = self.plugin(plugin_name).ok_or_else(|| {
                error!("Could not find plugin {} to ingest data", plugin_name);
                Error::lookup(format!("Could not find plugin {}", plugin_name))
            })?;

            let entities = plugin.ingest(params).await?;
            debug!("Plugin {} produced {} entities", plugin_name, entities.len());

            self.route(plugin_name, entities, state)
        }
        .instrument(span)
        .await
    }

    fn route(
        &self,
        plugin_name: &str,
        entities: Vec<DesignEntity>,
        state: &mut DesignState,
    ) -> Result<IngestSummary> {
        // Reject up front so a refused batch leaves the state untouched
        if self.unrecognized == UnrecognizedPolicy::Reject {
            if let Some(DesignEntity::Unrecognized { kind, name }) =
                entities.iter().find(|e| e.kind().is_none())
            {
                error!("Plugin {} produced unrecognized entity {} '{}'", plugin_name, kind, name);
                return Err(Error::processing(format!(
                    "Unrecognized entity kind '{}' for '{}' from plugin {}",
                    kind, name, plugin_name
                )));
            }
        }

        let mut summary = IngestSummary::new(plugin_name);

        for entity in entities {
            match entity {
                DesignEntity::Site(site) => {
                    let replaced = state.add_site(site).is_some();
                    summary.record(EntityKind::Site, replaced);
                }
                DesignEntity::Network(network) => {
                    let replaced = state.add_network(network).is_some();
                    summary.record(EntityKind::Network, replaced);
                }
                DesignEntity::NetworkLink(link) => {
                    let replaced = state.add_network_link(link).is_some();
                    summary.record(EntityKind::NetworkLink, replaced);
                }
                DesignEntity::HostProfile(profile) => {
                    let replaced = state.add_host_profile(profile).is_some();
                    summary.record(EntityKind::HostProfile, replaced);
                }
                DesignEntity::HardwareProfile(profile) => {
                    let replaced = state.add_hardware_profile(profile).is_some();
                    summary.record(EntityKind::HardwareProfile, replaced);
                }
                DesignEntity::BaremetalNode(node) => {
                    let replaced = state.add_baremetal_node(node).is_some();
                    summary.record(EntityKind::BaremetalNode, replaced);
                }
                DesignEntity::Unrecognized { kind, name } => {
                    match self.unrecognized {
                        UnrecognizedPolicy::Warn => {
                            warn!("Dropping unrecognized entity {} '{}' from plugin {}", kind, name, plugin_name)
                        }
                        _ => debug!("Dropping unrecognized entity {} '{}' from plugin {}", kind, name, plugin_name),
                    }
                    summary.dropped += 1;
                }
            }
        }

        Ok(summary)
    }

    fn plugin(&self, name: &str) -> Option<Arc<dyn IngesterPlugin>> {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);
        plugins.get(name).cloned()
    }

    /// List all registered plugin names, sorted
    pub fn plugin_names(&self) -> Vec<String> {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a plugin is registered
    pub fn has_plugin(&self, name: &str) -> bool {
        let plugins = self.plugins.read().unwrap_or_else(PoisonError::into_inner);
        plugins.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, NetworkLink, Site};
    use async_trait::async_trait;

    struct CannedPlugin {
        name: &'static str,
        entities: Vec<DesignEntity>,
    }

    #[async_trait]
    impl IngesterPlugin for CannedPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn ingest(&self, _params: &IngestParams) -> Result<Vec<DesignEntity>> {
            Ok(self.entities.clone())
        }
    }

    fn canned(name: &'static str, entities: Vec<DesignEntity>) -> Box<dyn IngesterPluginFactory> {
        Box::new(move || -> Result<Box<dyn IngesterPlugin>> {
            Ok(Box::new(CannedPlugin {
                name,
                entities: entities.clone(),
            }))
        })
    }

    fn network(name: &str, mtu: u32) -> Network {
        Network::new(name, "10.0.0.0/24".parse().unwrap()).with_mtu(mtu)
    }

    #[tokio::test]
    async fn test_merge_by_identity_keeps_second() {
        let ingester = Ingester::new();
        ingester
            .enable_plugins(vec![
                canned("first", vec![network("mgmt", 1500).into()]),
                canned("second", vec![network("mgmt", 9000).into()]),
            ])
            .unwrap();

        let mut state = DesignState::new();
        let params = IngestParams::default();

        let first = ingester.ingest_data("first", Some(&mut state), &params).await.unwrap();
        let second = ingester.ingest_data("second", Some(&mut state), &params).await.unwrap();

        assert_eq!(first.replaced, 0);
        assert_eq!(second.replaced, 1);
        assert_eq!(state.count(EntityKind::Network), 1);
        assert_eq!(state.networks().get("mgmt"), Some(&network("mgmt", 9000)));
    }

    #[tokio::test]
    async fn test_routes_every_kind() {
        let ingester = Ingester::new();
        ingester
            .enable_plugins(vec![canned(
                "mixed",
                vec![
                    Site::new("site").into(),
                    network("mgmt", 1500).into(),
                    NetworkLink::new("gp").allowing("mgmt").into(),
                ],
            )])
            .unwrap();

        let mut state = DesignState::new();
        let summary = ingester
            .ingest_data("mixed", Some(&mut state), &IngestParams::default())
            .await
            .unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.accepted.get(&EntityKind::Site), Some(&1));
        assert!(state.contains(EntityKind::NetworkLink, "gp"));
    }

    #[tokio::test]
    async fn test_unrecognized_warn_drops() {
        let ingester = Ingester::new();
        ingester
            .enable_plugins(vec![canned(
                "odd",
                vec![
                    DesignEntity::Unrecognized {
                        kind: "Rack".into(),
                        name: "r1".into(),
                    },
                    network("mgmt", 1500).into(),
                ],
            )])
            .unwrap();

        let mut state = DesignState::new();
        let summary = ingester
            .ingest_data("odd", Some(&mut state), &IngestParams::default())
            .await
            .unwrap();

        assert_eq!(summary.dropped, 1);
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_reject_leaves_state_untouched() {
        let ingester = Ingester::with_config(&IngesterConfig {
            unrecognized: UnrecognizedPolicy::Reject,
        });
        ingester
            .enable_plugins(vec![canned(
                "odd",
                vec![
                    network("mgmt", 1500).into(),
                    DesignEntity::Unrecognized {
                        kind: "Rack".into(),
                        name: "r1".into(),
                    },
                ],
            )])
            .unwrap();

        let mut state = DesignState::new();
        let err = ingester
            .ingest_data("odd", Some(&mut state), &IngestParams::default())
            .await
            .unwrap_err();

        assert!(err.is_processing());
        assert!(state.is_empty());
    }

    #[test]
    fn test_plugin_names_sorted() {
        let ingester = Ingester::new();
        ingester
            .enable_plugins(vec![canned("zeta", vec![]), canned("alpha", vec![])])
            .unwrap();

        assert_eq!(ingester.plugin_names(), vec!["alpha".to_string(), "zeta".to_string()]);
        assert!(ingester.has_plugin("zeta"));
    }
}
