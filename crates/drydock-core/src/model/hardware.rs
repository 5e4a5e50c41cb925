//! Hardware profiles
//!
//! A hardware profile describes a class of physical server. Host profiles and
//! nodes reference it by name; it has no inheritance of its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuSpec {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub cores: Option<u32>,
}

/// Maps a friendly device name to a bus address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAlias {
    pub address: String,
    #[serde(default)]
    pub dev_type: Option<String>,
    #[serde(default)]
    pub bus_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
    pub size: String,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub fstype: Option<String>,
    #[serde(default)]
    pub bootable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDevice {
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

/// Physical capability descriptor for a server class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub name: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(default)]
    pub hw_version: Option<String>,
    #[serde(default)]
    pub bios_version: Option<String>,
    #[serde(default)]
    pub boot_mode: Option<String>,
    #[serde(default)]
    pub bootstrap_protocol: Option<String>,
    #[serde(default)]
    pub pxe_interface: Option<u32>,
    #[serde(default)]
    pub cpu: CpuSpec,
    #[serde(default)]
    pub cpu_sets: BTreeMap<String, String>,
    #[serde(default)]
    pub device_aliases: BTreeMap<String, DeviceAlias>,
    #[serde(default)]
    pub storage: Vec<StorageDevice>,
}

impl HardwareProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: None,
            generation: None,
            hw_version: None,
            bios_version: None,
            boot_mode: None,
            bootstrap_protocol: None,
            pxe_interface: None,
            cpu: CpuSpec::default(),
            cpu_sets: BTreeMap::new(),
            device_aliases: BTreeMap::new(),
            storage: Vec::new(),
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
}
