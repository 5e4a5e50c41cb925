//! Design model
//!
//! Typed entities describing a site: networks, links, host and hardware
//! profiles, and bare-metal nodes. Entities reference each other by name
//! within the site; nothing here owns anything else.
//!
//! - [`Site`]: top-level namespace
//! - [`Network`] / [`NetworkLink`]: L3 segments and the links carrying them
//! - [`HostProfile`] / [`BaremetalNode`]: host templates and servers
//! - [`HardwareProfile`]: server class descriptor
//! - [`DesignEntity`]: the closed sum type plugins produce

pub mod hardware;
pub mod host;
pub mod network;
pub mod site;

pub use hardware::{CpuSpec, DeviceAlias, HardwareProfile, Partition, StorageDevice};
pub use host::{
    AddressAssignment, BaremetalNode, HostInterface, HostProfile, HostSettings, NodeAddress,
    PlatformConfig,
};
pub use network::{
    AddressRange, BondingConfig, BondingMode, Cidr, DnsConfig, Network, NetworkLink,
    NetworkRoute, RangeType, TrunkMode, TrunkingConfig, DEFAULT_MTU,
};
pub use site::{Site, TagDefinition};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six entity kinds of a site design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Site,
    Network,
    NetworkLink,
    HostProfile,
    HardwareProfile,
    BaremetalNode,
}

impl EntityKind {
    /// All kinds, in resolution order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Site,
        EntityKind::Network,
        EntityKind::NetworkLink,
        EntityKind::HostProfile,
        EntityKind::HardwareProfile,
        EntityKind::BaremetalNode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Site => "Site",
            EntityKind::Network => "Network",
            EntityKind::NetworkLink => "NetworkLink",
            EntityKind::HostProfile => "HostProfile",
            EntityKind::HardwareProfile => "HardwareProfile",
            EntityKind::BaremetalNode => "BaremetalNode",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything addressable by name within a site
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(Site, Network, NetworkLink, HostProfile, HardwareProfile, BaremetalNode);

/// One entity produced by an ingestion plugin
///
/// `Unrecognized` carries documents a plugin read but could not type; the
/// ingester applies its configured policy to them.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignEntity {
    Site(Site),
    Network(Network),
    NetworkLink(NetworkLink),
    HostProfile(HostProfile),
    HardwareProfile(HardwareProfile),
    BaremetalNode(BaremetalNode),
    Unrecognized {
        /// Kind as written in the source document
        kind: String,
        name: String,
    },
}

impl DesignEntity {
    /// The entity kind, or `None` for unrecognized entities
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            DesignEntity::Site(_) => Some(EntityKind::Site),
            DesignEntity::Network(_) => Some(EntityKind::Network),
            DesignEntity::NetworkLink(_) => Some(EntityKind::NetworkLink),
            DesignEntity::HostProfile(_) => Some(EntityKind::HostProfile),
            DesignEntity::HardwareProfile(_) => Some(EntityKind::HardwareProfile),
            DesignEntity::BaremetalNode(_) => Some(EntityKind::BaremetalNode),
            DesignEntity::Unrecognized { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DesignEntity::Site(e) => e.name(),
            DesignEntity::Network(e) => e.name(),
            DesignEntity::NetworkLink(e) => e.name(),
            DesignEntity::HostProfile(e) => e.name(),
            DesignEntity::HardwareProfile(e) => e.name(),
            DesignEntity::BaremetalNode(e) => e.name(),
            DesignEntity::Unrecognized { name, .. } => name,
        }
    }
}

macro_rules! impl_from_entity {
    ($($variant:ident),* $(,)?) => {
        $(impl From<$variant> for DesignEntity {
            fn from(value: $variant) -> Self {
                DesignEntity::$variant(value)
            }
        })*
    };
}

impl_from_entity!(Site, Network, NetworkLink, HostProfile, HardwareProfile, BaremetalNode);
