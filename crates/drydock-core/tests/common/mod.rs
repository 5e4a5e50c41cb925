//! Test doubles and common utilities for contract tests
//!
//! Plugins here produce canned entities and count their calls; nothing parses
//! a real document format.

#![allow(dead_code)]

use async_trait::async_trait;
use drydock_core::error::{Error, Result};
use drydock_core::model::{
    BaremetalNode, DesignEntity, HostProfile, Network, NetworkLink, Site,
};
use drydock_core::source::SourceRegistry;
use drydock_core::traits::{DesignSource, IngestParams, IngesterPlugin, IngesterPluginFactory};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// A plugin returning the same entities on every call
pub struct CannedPlugin {
    name: String,
    entities: Vec<DesignEntity>,
    ingest_calls: Arc<AtomicUsize>,
}

impl CannedPlugin {
    pub fn new(name: &str, entities: Vec<DesignEntity>) -> Self {
        Self {
            name: name.to_string(),
            entities,
            ingest_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter shared with every plugin this factory hands out
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.ingest_calls)
    }
}

#[async_trait]
impl IngesterPlugin for CannedPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ingest(&self, _params: &IngestParams) -> Result<Vec<DesignEntity>> {
        self.ingest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entities.clone())
    }
}

/// Factory for [`CannedPlugin`], counting constructions and ingest calls
pub struct CannedFactory {
    name: String,
    entities: Vec<DesignEntity>,
    pub created: Arc<AtomicUsize>,
    pub ingest_calls: Arc<AtomicUsize>,
}

impl CannedFactory {
    pub fn new(name: &str, entities: Vec<DesignEntity>) -> Self {
        Self {
            name: name.to_string(),
            entities,
            created: Arc::new(AtomicUsize::new(0)),
            ingest_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn ingest_count(&self) -> usize {
        self.ingest_calls.load(Ordering::SeqCst)
    }
}

impl IngesterPluginFactory for CannedFactory {
    fn create(&self) -> Result<Box<dyn IngesterPlugin>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let mut plugin = CannedPlugin::new(&self.name, self.entities.clone());
        plugin.ingest_calls = Arc::clone(&self.ingest_calls);
        Ok(Box::new(plugin))
    }
}

/// A factory whose plugin can never be constructed
pub struct BrokenFactory;

impl IngesterPluginFactory for BrokenFactory {
    fn create(&self) -> Result<Box<dyn IngesterPlugin>> {
        Err(Error::plugin("broken", "constructor raised"))
    }
}

/// A plugin that always fails to ingest
pub struct FailingPlugin;

#[async_trait]
impl IngesterPlugin for FailingPlugin {
    fn name(&self) -> &str {
        "failing"
    }

    async fn ingest(&self, _params: &IngestParams) -> Result<Vec<DesignEntity>> {
        Err(Error::plugin("failing", "source unreadable"))
    }
}

/// Serves documents from memory under the `mem` scheme
///
/// `mem:<key>` returns the document stored under `<key>`.
#[derive(Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn with_document(mut self, key: &str, text: &str) -> Self {
        self.documents.insert(key.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl DesignSource for MemorySource {
    fn scheme(&self) -> &str {
        "mem"
    }

    async fn fetch(&self, design_ref: &Url) -> Result<String> {
        self.documents
            .get(design_ref.path())
            .cloned()
            .ok_or_else(|| Error::processing(format!("No document at {}", design_ref)))
    }
}

/// A registry with only the in-memory source
pub fn memory_sources(source: MemorySource) -> Arc<SourceRegistry> {
    let registry = SourceRegistry::new();
    registry.register_source(Arc::new(source));
    Arc::new(registry)
}

/// Selects canned entities by document text, one entity set per document
pub struct KeyedPlugin {
    documents: HashMap<String, Vec<DesignEntity>>,
}

impl KeyedPlugin {
    pub fn new(documents: Vec<(&str, Vec<DesignEntity>)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(key, entities)| (key.to_string(), entities))
                .collect(),
        }
    }
}

#[async_trait]
impl IngesterPlugin for KeyedPlugin {
    fn name(&self) -> &str {
        "keyed"
    }

    async fn ingest(&self, params: &IngestParams) -> Result<Vec<DesignEntity>> {
        let key = params.content.as_deref().unwrap_or_default();
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| Error::processing(format!("Unknown document '{}'", key)))
    }
}

pub fn network(name: &str, cidr: &str, mtu: u32) -> Network {
    Network::new(name, cidr.parse().expect("valid cidr")).with_mtu(mtu)
}

pub fn profile(name: &str, parent: Option<&str>) -> HostProfile {
    let profile = HostProfile::new(name);
    match parent {
        Some(parent) => profile.with_parent(parent),
        None => profile,
    }
}

/// A small, clean design: one site, two networks on one trunked link
pub fn minimal_site(mtu: u32, link_mtu: u32) -> Vec<DesignEntity> {
    vec![
        Site::new("sitename").into(),
        network("mgmt", "172.16.1.0/24", mtu).into(),
        network("private", "172.16.2.0/24", mtu).into(),
        NetworkLink::new("pxe-rack1")
            .with_mtu(link_mtu)
            .allowing("mgmt")
            .allowing("private")
            .with_trunking(drydock_core::model::TrunkMode::Dot1q, Some("mgmt"))
            .into(),
    ]
}

pub fn node(name: &str, host_profile: &str) -> BaremetalNode {
    BaremetalNode::new(name, host_profile)
}
