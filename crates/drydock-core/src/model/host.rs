// # Host Model
//
// Host profiles and the bare-metal nodes built from them. Both carry the same
// `HostSettings` block; a profile may name a parent profile and a node always
// names the profile it is stamped from. Resolution flattens those chains with
// `HostSettings::merged_over`, the child overriding the parent.
//
// ## Removal markers
//
// Inside a child, an interface named `!eth0`, a tag `!foo` or a map key
// `!console` removes the inherited entry instead of adding one. Markers never
// survive a merge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

const REMOVE_MARKER: char = '!';

/// Boot image and kernel selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub kernel: Option<String>,
    #[serde(default)]
    pub kernel_params: BTreeMap<String, String>,
}

/// A host interface bound to a network link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostInterface {
    pub device_name: String,
    #[serde(default)]
    pub network_link: Option<String>,
    /// Physical devices enslaved to this interface (bonds)
    #[serde(default)]
    pub slaves: Vec<String>,
    /// Networks configured on this interface
    #[serde(default)]
    pub networks: Vec<String>,
}

impl HostInterface {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            network_link: None,
            slaves: Vec::new(),
            networks: Vec::new(),
        }
    }

    pub fn on_link(mut self, link: impl Into<String>) -> Self {
        self.network_link = Some(link.into());
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    fn merged_over(&self, parent: &HostInterface) -> HostInterface {
        HostInterface {
            device_name: self.device_name.clone(),
            network_link: self.network_link.clone().or_else(|| parent.network_link.clone()),
            slaves: if self.slaves.is_empty() {
                parent.slaves.clone()
            } else {
                self.slaves.clone()
            },
            networks: if self.networks.is_empty() {
                parent.networks.clone()
            } else {
                self.networks.clone()
            },
        }
    }
}

/// Settings shared by host profiles and bare-metal nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub hardware_profile: Option<String>,
    #[serde(default)]
    pub primary_network: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<HostInterface>,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rack: Option<String>,
    #[serde(default)]
    pub owner_data: BTreeMap<String, String>,
}

impl HostSettings {
    /// Overlay `self` on `parent`
    ///
    /// Scalar settings present on `self` win. Interfaces merge by device name,
    /// field by field. Tags merge as an ordered union. Maps merge key by key.
    /// Removal markers on `self` delete the inherited entry.
    pub fn merged_over(&self, parent: &HostSettings) -> HostSettings {
        HostSettings {
            hardware_profile: self
                .hardware_profile
                .clone()
                .or_else(|| parent.hardware_profile.clone()),
            primary_network: self
                .primary_network
                .clone()
                .or_else(|| parent.primary_network.clone()),
            interfaces: merge_interfaces(&self.interfaces, &parent.interfaces),
            platform: PlatformConfig {
                image: self.platform.image.clone().or_else(|| parent.platform.image.clone()),
                kernel: self.platform.kernel.clone().or_else(|| parent.platform.kernel.clone()),
                kernel_params: merge_maps(&self.platform.kernel_params, &parent.platform.kernel_params),
            },
            tags: merge_lists(&self.tags, &parent.tags),
            rack: self.rack.clone().or_else(|| parent.rack.clone()),
            owner_data: merge_maps(&self.owner_data, &parent.owner_data),
        }
    }

    /// Look up an interface by device name
    pub fn interface(&self, device_name: &str) -> Option<&HostInterface> {
        self.interfaces.iter().find(|i| i.device_name == device_name)
    }
}

fn removal_target(name: &str) -> Option<&str> {
    name.strip_prefix(REMOVE_MARKER)
}

fn merge_interfaces(child: &[HostInterface], parent: &[HostInterface]) -> Vec<HostInterface> {
    let mut merged: Vec<HostInterface> = parent
        .iter()
        .filter(|i| removal_target(&i.device_name).is_none())
        .cloned()
        .collect();

    for iface in child {
        if let Some(target) = removal_target(&iface.device_name) {
            merged.retain(|i| i.device_name != target);
            continue;
        }
        match merged.iter_mut().find(|i| i.device_name == iface.device_name) {
            Some(existing) => *existing = iface.merged_over(existing),
            None => merged.push(iface.clone()),
        }
    }

    merged
}

fn merge_lists(child: &[String], parent: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = parent
        .iter()
        .filter(|s| removal_target(s).is_none())
        .cloned()
        .collect();

    for item in child {
        if let Some(target) = removal_target(item) {
            merged.retain(|s| s != target);
        } else if !merged.contains(item) {
            merged.push(item.clone());
        }
    }

    merged
}

fn merge_maps(
    child: &BTreeMap<String, String>,
    parent: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = parent
        .iter()
        .filter(|(k, _)| removal_target(k).is_none())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (key, value) in child {
        match removal_target(key) {
            Some(target) => {
                merged.remove(target);
            }
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

/// A reusable host template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostProfile {
    pub name: String,

    /// Profile this one inherits from
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(flatten)]
    pub settings: HostSettings,
}

impl HostProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            settings: HostSettings::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_settings(mut self, settings: HostSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// How a node obtains its address on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AddressAssignment {
    Dhcp,
    Static(IpAddr),
}

impl AddressAssignment {
    /// The static address, if any
    pub fn static_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Static(ip) => Some(*ip),
            Self::Dhcp => None,
        }
    }
}

impl TryFrom<String> for AddressAssignment {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("dhcp") {
            return Ok(Self::Dhcp);
        }
        value
            .trim()
            .parse()
            .map(Self::Static)
            .map_err(|_| crate::Error::processing(format!("Invalid address '{}'", value)))
    }
}

impl From<AddressAssignment> for String {
    fn from(value: AddressAssignment) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AddressAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dhcp => f.write_str("dhcp"),
            Self::Static(ip) => write!(f, "{}", ip),
        }
    }
}

/// A node's address on one network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub network: String,
    pub address: AddressAssignment,
}

/// A physical server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaremetalNode {
    pub name: String,

    /// Profile the node is built from
    pub host_profile: String,

    /// Per-node overrides of the profile's settings
    #[serde(flatten)]
    pub settings: HostSettings,

    #[serde(default)]
    pub addressing: Vec<NodeAddress>,

    #[serde(default)]
    pub oob_address: Option<IpAddr>,
}

impl BaremetalNode {
    pub fn new(name: impl Into<String>, host_profile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_profile: host_profile.into(),
            settings: HostSettings::default(),
            addressing: Vec::new(),
            oob_address: None,
        }
    }

    pub fn with_settings(mut self, settings: HostSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add an address on a network
    pub fn with_address(mut self, network: impl Into<String>, address: AddressAssignment) -> Self {
        self.addressing.push(NodeAddress {
            network: network.into(),
            address,
        });
        self
    }
}
