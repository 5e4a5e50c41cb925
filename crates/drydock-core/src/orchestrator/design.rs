//! The frozen site design
//!
//! A [`SiteDesign`] is produced once per resolution and never mutated. Every
//! entity in it is effective: host profiles and nodes carry their flattened
//! settings, and every name reference inside it resolves.

use crate::model::{
    BaremetalNode, EntityKind, HardwareProfile, HostProfile, Named, Network, NetworkLink, Site,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A recoverable condition found during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionIssue {
    /// Kind of the entity concerned, if any
    pub kind: Option<EntityKind>,
    /// Name of the entity concerned, if any
    pub name: Option<String>,
    pub message: String,
}

impl ResolutionIssue {
    pub(crate) fn design(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            name: None,
            message: message.into(),
        }
    }

    pub(crate) fn entity(kind: EntityKind, name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: Some(name.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.name) {
            (Some(kind), Some(name)) => write!(f, "{} {}: {}", kind, name, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Outcome of a successful resolution
///
/// Structural failures are errors, never a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "issues", rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Everything resolved cleanly
    Resolved,
    /// Resolved, but optional parts of the design are missing
    ResolvedWithIssues(Vec<ResolutionIssue>),
}

impl ResolutionStatus {
    pub(crate) fn from_issues(issues: Vec<ResolutionIssue>) -> Self {
        if issues.is_empty() {
            Self::Resolved
        } else {
            Self::ResolvedWithIssues(issues)
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    pub fn issues(&self) -> &[ResolutionIssue] {
        match self {
            Self::Resolved => &[],
            Self::ResolvedWithIssues(issues) => issues,
        }
    }
}

fn index_by_name<T: Named>(items: &[T]) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.name().to_string(), pos))
        .collect()
}

#[derive(Debug, Clone, Default)]
struct DesignIndex {
    networks: HashMap<String, usize>,
    network_links: HashMap<String, usize>,
    host_profiles: HashMap<String, usize>,
    hardware_profiles: HashMap<String, usize>,
    baremetal_nodes: HashMap<String, usize>,
    /// Network name -> position of its carrying link
    carrying_link: HashMap<String, usize>,
}

/// Immutable, fully-resolved site design
///
/// Slices preserve declaration order (first appearance of each identity
/// across all ingested documents).
#[derive(Debug, Clone, Serialize)]
pub struct SiteDesign {
    site: Option<Site>,
    networks: Vec<Network>,
    network_links: Vec<NetworkLink>,
    host_profiles: Vec<HostProfile>,
    hardware_profiles: Vec<HardwareProfile>,
    baremetal_nodes: Vec<BaremetalNode>,
    resolved_at: DateTime<Utc>,
    #[serde(skip)]
    index: DesignIndex,
}

pub(crate) struct SiteDesignParts {
    pub site: Option<Site>,
    pub networks: Vec<Network>,
    pub network_links: Vec<NetworkLink>,
    pub host_profiles: Vec<HostProfile>,
    pub hardware_profiles: Vec<HardwareProfile>,
    pub baremetal_nodes: Vec<BaremetalNode>,
    /// Network name -> carrying link name
    pub carrying_link: HashMap<String, String>,
}

impl SiteDesign {
    pub(crate) fn freeze(parts: SiteDesignParts) -> Self {
        let network_links = index_by_name(&parts.network_links);
        let carrying_link = parts
            .carrying_link
            .iter()
            .filter_map(|(network, link)| network_links.get(link).map(|&pos| (network.clone(), pos)))
            .collect();

        let index = DesignIndex {
            networks: index_by_name(&parts.networks),
            network_links,
            host_profiles: index_by_name(&parts.host_profiles),
            hardware_profiles: index_by_name(&parts.hardware_profiles),
            baremetal_nodes: index_by_name(&parts.baremetal_nodes),
            carrying_link,
        };

        Self {
            site: parts.site,
            networks: parts.networks,
            network_links: parts.network_links,
            host_profiles: parts.host_profiles,
            hardware_profiles: parts.hardware_profiles,
            baremetal_nodes: parts.baremetal_nodes,
            resolved_at: Utc::now(),
            index,
        }
    }

    pub fn site(&self) -> Option<&Site> {
        self.site.as_ref()
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn network(&self, name: &str) -> Option<&Network> {
        self.index.networks.get(name).map(|&pos| &self.networks[pos])
    }

    pub fn network_links(&self) -> &[NetworkLink] {
        &self.network_links
    }

    pub fn network_link(&self, name: &str) -> Option<&NetworkLink> {
        self.index.network_links.get(name).map(|&pos| &self.network_links[pos])
    }

    /// The link carrying a network, if any
    pub fn carrying_link(&self, network: &str) -> Option<&NetworkLink> {
        self.index
            .carrying_link
            .get(network)
            .map(|&pos| &self.network_links[pos])
    }

    /// Host profiles with their inheritance chains flattened
    pub fn host_profiles(&self) -> &[HostProfile] {
        &self.host_profiles
    }

    pub fn host_profile(&self, name: &str) -> Option<&HostProfile> {
        self.index.host_profiles.get(name).map(|&pos| &self.host_profiles[pos])
    }

    pub fn hardware_profiles(&self) -> &[HardwareProfile] {
        &self.hardware_profiles
    }

    pub fn hardware_profile(&self, name: &str) -> Option<&HardwareProfile> {
        self.index
            .hardware_profiles
            .get(name)
            .map(|&pos| &self.hardware_profiles[pos])
    }

    /// Nodes with their profile settings applied
    pub fn baremetal_nodes(&self) -> &[BaremetalNode] {
        &self.baremetal_nodes
    }

    pub fn baremetal_node(&self, name: &str) -> Option<&BaremetalNode> {
        self.index
            .baremetal_nodes
            .get(name)
            .map(|&pos| &self.baremetal_nodes[pos])
    }

    /// When this snapshot was frozen
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Total number of entities in the design, the site included
    pub fn entity_count(&self) -> usize {
        usize::from(self.site.is_some())
            + self.networks.len()
            + self.network_links.len()
            + self.host_profiles.len()
            + self.hardware_profiles.len()
            + self.baremetal_nodes.len()
    }
}
