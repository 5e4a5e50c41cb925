// # Network Model
//
// Networks (L3 segments) and the network links (L2/physical bundles) that
// carry them. A link's MTU is the ceiling for every network riding on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Default MTU for networks and links that don't declare one
pub const DEFAULT_MTU: u32 = 1500;

fn default_mtu() -> u32 {
    DEFAULT_MTU
}

/// An IPv4 or IPv6 prefix in `address/length` notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    addr: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Create a prefix, rejecting lengths the address family can't hold
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, crate::Error> {
        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix > max {
            return Err(crate::Error::processing(format!(
                "Prefix length {} exceeds {} for {}",
                prefix, max, addr
            )));
        }
        Ok(Self { addr, prefix })
    }

    /// The address as written
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Prefix length in bits
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The address with host bits cleared
    pub fn network(&self) -> IpAddr {
        masked(self.addr, self.prefix)
    }

    /// Whether `ip` falls inside this prefix
    pub fn contains(&self, ip: IpAddr) -> bool {
        same_family(self.addr, ip) && masked(ip, self.prefix) == self.network()
    }

    /// Whether the two prefixes share at least one address
    pub fn overlaps(&self, other: &Cidr) -> bool {
        if !same_family(self.addr, other.addr) {
            return false;
        }
        let prefix = self.prefix.min(other.prefix);
        masked(self.addr, prefix) == masked(other.addr, prefix)
    }
}

fn same_family(a: IpAddr, b: IpAddr) -> bool {
    matches!(
        (a, b),
        (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_))
    )
}

fn masked(ip: IpAddr, prefix: u8) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - u32::from(prefix)) };
            IpAddr::from((bits & mask).to_be_bytes())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let mask = if prefix == 0 { 0 } else { u128::MAX << (128 - u32::from(prefix)) };
            IpAddr::from((bits & mask).to_be_bytes())
        }
    }
}

impl FromStr for Cidr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| crate::Error::processing(format!("Invalid CIDR '{}': missing prefix", s)))?;

        let addr: IpAddr = addr
            .parse()
            .map_err(|_| crate::Error::processing(format!("Invalid CIDR '{}': bad address", s)))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| crate::Error::processing(format!("Invalid CIDR '{}': bad prefix", s)))?;

        Cidr::new(addr, prefix)
    }
}

impl TryFrom<String> for Cidr {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// DNS settings handed to hosts on a network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsConfig {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub servers: Vec<String>,
}

/// A static route reachable through this network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRoute {
    pub subnet: Cidr,
    pub gateway: IpAddr,
    #[serde(default)]
    pub metric: Option<u32>,
}

/// Purpose of an address range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeType {
    Static,
    Dhcp,
    Reserved,
}

/// A contiguous block of addresses within a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRange {
    #[serde(rename = "type")]
    pub range_type: RangeType,
    pub start: IpAddr,
    pub end: IpAddr,
}

/// A layer-3 network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Unique within the site
    pub name: String,

    pub cidr: Cidr,

    #[serde(default = "default_mtu")]
    pub mtu: u32,

    /// Carrying link; when absent the link listing this network in
    /// `allowed_networks` carries it
    #[serde(default)]
    pub network_link: Option<String>,

    #[serde(default)]
    pub vlan_id: Option<u16>,

    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub routes: Vec<NetworkRoute>,

    #[serde(default)]
    pub ranges: Vec<AddressRange>,
}

impl Network {
    /// Create a network with the default MTU and no explicit link
    pub fn new(name: impl Into<String>, cidr: Cidr) -> Self {
        Self {
            name: name.into(),
            cidr,
            mtu: DEFAULT_MTU,
            network_link: None,
            vlan_id: None,
            dns: DnsConfig::default(),
            routes: Vec::new(),
            ranges: Vec::new(),
        }
    }

    /// Set the MTU
    pub fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Name the carrying link explicitly
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.network_link = Some(link.into());
        self
    }
}

/// Link aggregation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondingMode {
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    #[serde(rename = "active-backup")]
    ActiveBackup,
    #[serde(rename = "802.3ad")]
    Lacp,
    #[serde(rename = "balance-rr")]
    BalanceRr,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondingConfig {
    #[serde(default)]
    pub mode: BondingMode,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub peer_rate: Option<String>,
    #[serde(default)]
    pub mon_rate: Option<u32>,
    #[serde(default)]
    pub up_delay: Option<u32>,
    #[serde(default)]
    pub down_delay: Option<u32>,
}

/// VLAN trunking mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrunkMode {
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    #[serde(rename = "802.1q")]
    Dot1q,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrunkingConfig {
    #[serde(default)]
    pub mode: TrunkMode,
    /// Untagged network on a trunk, or the only network on an access link
    #[serde(default)]
    pub default_network: Option<String>,
}

/// A physical (or bonded) link carrying one or more networks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub name: String,

    /// Physical-layer ceiling for every network on this link
    #[serde(default = "default_mtu")]
    pub mtu: u32,

    #[serde(default)]
    pub bonding: BondingConfig,

    #[serde(default)]
    pub linkspeed: Option<String>,

    #[serde(default)]
    pub trunking: TrunkingConfig,

    /// Names of the networks allowed on this link
    #[serde(default)]
    pub allowed_networks: Vec<String>,
}

impl NetworkLink {
    /// Create a link with the default MTU, no bonding and no trunking
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mtu: DEFAULT_MTU,
            bonding: BondingConfig::default(),
            linkspeed: None,
            trunking: TrunkingConfig::default(),
            allowed_networks: Vec::new(),
        }
    }

    /// Set the MTU
    pub fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Allow a network on this link
    pub fn allowing(mut self, network: impl Into<String>) -> Self {
        self.allowed_networks.push(network.into());
        self
    }

    /// Set the trunking configuration
    pub fn with_trunking(mut self, mode: TrunkMode, default_network: Option<&str>) -> Self {
        self.trunking = TrunkingConfig {
            mode,
            default_network: default_network.map(str::to_string),
        };
        self
    }
}
