// # Design State
//
// Mutable accumulator of design entities gathered across one or more
// ingestion calls.
//
// ## Purpose
//
// Every entity is keyed by (kind, name). Adding an entity whose identity is
// already present replaces the earlier value in place, so later documents
// refine earlier ones and two values never coexist under one identity.
//
// ## Ordering
//
// Each kind keeps declaration order: the position of an identity is where it
// was first added, even after it is replaced. Validators rely on this for
// deterministic output.
//
// ## Lifecycle
//
// A `DesignState` is a builder. `finalize()` consumes it and produces the
// immutable `SiteDesign`; nothing can observe or mutate it afterwards.

mod collection;

use crate::model::{
    BaremetalNode, EntityKind, HardwareProfile, HostProfile, Network, NetworkLink, Site,
};
use crate::orchestrator::{ResolutionStatus, SiteDesign};
use crate::Result;

pub(crate) use collection::Collection;

/// Accumulated, not yet resolved, design entities
///
/// # Example
///
/// ```rust
/// use drydock_core::model::{Network, EntityKind};
/// use drydock_core::DesignState;
///
/// let mut state = DesignState::new();
/// state.add_network(Network::new("mgmt", "10.0.0.0/24".parse().unwrap()));
/// let previous = state.add_network(Network::new("mgmt", "10.0.1.0/24".parse().unwrap()));
///
/// assert!(previous.is_some());
/// assert_eq!(state.count(EntityKind::Network), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DesignState {
    sites: Collection<Site>,
    networks: Collection<Network>,
    network_links: Collection<NetworkLink>,
    host_profiles: Collection<HostProfile>,
    hardware_profiles: Collection<HardwareProfile>,
    baremetal_nodes: Collection<BaremetalNode>,
}

impl DesignState {
    /// Create a new empty design state
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a site, returning the value it replaced
    pub fn add_site(&mut self, site: Site) -> Option<Site> {
        self.sites.upsert(site)
    }

    /// Upsert a network, returning the value it replaced
    pub fn add_network(&mut self, network: Network) -> Option<Network> {
        self.networks.upsert(network)
    }

    /// Upsert a network link, returning the value it replaced
    pub fn add_network_link(&mut self, link: NetworkLink) -> Option<NetworkLink> {
        self.network_links.upsert(link)
    }

    /// Upsert a host profile, returning the value it replaced
    pub fn add_host_profile(&mut self, profile: HostProfile) -> Option<HostProfile> {
        self.host_profiles.upsert(profile)
    }

    /// Upsert a hardware profile, returning the value it replaced
    pub fn add_hardware_profile(&mut self, profile: HardwareProfile) -> Option<HardwareProfile> {
        self.hardware_profiles.upsert(profile)
    }

    /// Upsert a bare-metal node, returning the value it replaced
    pub fn add_baremetal_node(&mut self, node: BaremetalNode) -> Option<BaremetalNode> {
        self.baremetal_nodes.upsert(node)
    }

    /// Number of entities of one kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Site => self.sites.len(),
            EntityKind::Network => self.networks.len(),
            EntityKind::NetworkLink => self.network_links.len(),
            EntityKind::HostProfile => self.host_profiles.len(),
            EntityKind::HardwareProfile => self.hardware_profiles.len(),
            EntityKind::BaremetalNode => self.baremetal_nodes.len(),
        }
    }

    /// Whether an entity with this identity has been added
    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        match kind {
            EntityKind::Site => self.sites.contains(name),
            EntityKind::Network => self.networks.contains(name),
            EntityKind::NetworkLink => self.network_links.contains(name),
            EntityKind::HostProfile => self.host_profiles.contains(name),
            EntityKind::HardwareProfile => self.hardware_profiles.contains(name),
            EntityKind::BaremetalNode => self.baremetal_nodes.contains(name),
        }
    }

    /// Total number of entities across all kinds
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Check if the state is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the accumulated entities into an immutable site design
    ///
    /// See [`crate::orchestrator::resolve`] for the resolution pipeline.
    pub fn finalize(self) -> Result<(ResolutionStatus, SiteDesign)> {
        crate::orchestrator::resolve(self)
    }

    pub(crate) fn sites(&self) -> &Collection<Site> {
        &self.sites
    }

    pub(crate) fn networks(&self) -> &Collection<Network> {
        &self.networks
    }

    pub(crate) fn network_links(&self) -> &Collection<NetworkLink> {
        &self.network_links
    }

    pub(crate) fn host_profiles(&self) -> &Collection<HostProfile> {
        &self.host_profiles
    }

    pub(crate) fn hardware_profiles(&self) -> &Collection<HardwareProfile> {
        &self.hardware_profiles
    }

    pub(crate) fn baremetal_nodes(&self) -> &Collection<BaremetalNode> {
        &self.baremetal_nodes
    }
}
