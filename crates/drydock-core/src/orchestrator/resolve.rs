//! Effective-design resolution
//!
//! One-shot pipeline over a consumed [`DesignState`]:
//!
//! ```text
//! Accumulate ──▶ Flatten ──▶ Resolve references ──▶ Freeze
//!  (state)      (profiles,     (every name must      (SiteDesign +
//!                nodes)         resolve)              indexes)
//! ```
//!
//! Fatal conditions (inheritance cycles, dangling references, several sites)
//! are `Error::Processing` and no partial design is returned. Recoverable
//! ones become [`ResolutionIssue`]s on the returned status.

use super::design::{ResolutionIssue, ResolutionStatus, SiteDesign, SiteDesignParts};
use crate::error::{Error, Result};
use crate::model::{BaremetalNode, EntityKind, HostProfile, HostSettings, NetworkLink};
use crate::state::{Collection, DesignState};
use std::collections::HashMap;
use tracing::debug;

/// Resolve accumulated entities into an immutable site design
///
/// # Returns
///
/// - `Ok((ResolutionStatus, SiteDesign))`: The effective design and whether
///   optional parts were missing
/// - `Err(Error::Processing)`: Inheritance cycle, dangling reference or
///   conflicting sites
pub fn resolve(state: DesignState) -> Result<(ResolutionStatus, SiteDesign)> {
    let mut issues = Vec::new();

    if state.is_empty() {
        issues.push(ResolutionIssue::design("Design contains no entities"));
    }

    let site = match state.sites().len() {
        0 => {
            issues.push(ResolutionIssue::design("Design does not define a Site"));
            None
        }
        1 => state.sites().iter().next().cloned(),
        _ => {
            let names: Vec<&str> = state.sites().iter().map(|s| s.name.as_str()).collect();
            return Err(Error::processing(format!(
                "Design defines more than one Site: {}",
                names.join(", ")
            )));
        }
    };

    let effective = flatten_profiles(state.host_profiles())?;

    let host_profiles: Vec<HostProfile> = state
        .host_profiles()
        .iter()
        .map(|profile| HostProfile {
            name: profile.name.clone(),
            parent: profile.parent.clone(),
            settings: effective[&profile.name].clone(),
        })
        .collect();

    let baremetal_nodes = flatten_nodes(state.baremetal_nodes(), &effective)?;

    let mut dangling = Vec::new();
    check_references(&state, &host_profiles, &baremetal_nodes, &mut dangling);
    if !dangling.is_empty() {
        return Err(Error::processing(dangling.join("; ")));
    }

    let carrying_link = carrying_links(&state, &mut issues);

    for node in &baremetal_nodes {
        if node.settings.hardware_profile.is_none() {
            issues.push(ResolutionIssue::entity(
                EntityKind::BaremetalNode,
                &node.name,
                "no hardware profile on the node or its host profile",
            ));
        }
    }

    let parts = SiteDesignParts {
        site,
        networks: state.networks().iter().cloned().collect(),
        network_links: state.network_links().iter().cloned().collect(),
        host_profiles,
        hardware_profiles: state.hardware_profiles().iter().cloned().collect(),
        baremetal_nodes,
        carrying_link,
    };

    let design = SiteDesign::freeze(parts);
    debug!(
        "Resolved site design with {} entities ({} issue(s))",
        design.entity_count(),
        issues.len()
    );

    Ok((ResolutionStatus::from_issues(issues), design))
}

/// Flatten every host profile's parent chain, child overriding parent
fn flatten_profiles(profiles: &Collection<HostProfile>) -> Result<HashMap<String, HostSettings>> {
    let mut effective = HashMap::new();
    for profile in profiles.iter() {
        let mut chain = Vec::new();
        flatten_profile(&profile.name, profiles, &mut effective, &mut chain)?;
    }
    Ok(effective)
}

fn flatten_profile(
    name: &str,
    profiles: &Collection<HostProfile>,
    effective: &mut HashMap<String, HostSettings>,
    chain: &mut Vec<String>,
) -> Result<HostSettings> {
    if let Some(settings) = effective.get(name) {
        return Ok(settings.clone());
    }

    if let Some(start) = chain.iter().position(|n| n == name) {
        let mut cycle: Vec<&str> = chain[start..].iter().map(String::as_str).collect();
        cycle.push(name);
        return Err(Error::processing(format!(
            "HostProfile inheritance cycle: {}",
            cycle.join(" -> ")
        )));
    }

    let Some(profile) = profiles.get(name) else {
        let child = chain.last().map(String::as_str).unwrap_or("<root>");
        return Err(Error::processing(format!(
            "HostProfile {} references undefined parent HostProfile {}",
            child, name
        )));
    };

    chain.push(name.to_string());
    let parent = match &profile.parent {
        Some(parent) => flatten_profile(parent, profiles, effective, chain)?,
        None => HostSettings::default(),
    };
    chain.pop();

    let settings = profile.settings.merged_over(&parent);
    effective.insert(name.to_string(), settings.clone());
    Ok(settings)
}

fn flatten_nodes(
    nodes: &Collection<BaremetalNode>,
    effective: &HashMap<String, HostSettings>,
) -> Result<Vec<BaremetalNode>> {
    nodes
        .iter()
        .map(|node| {
            let profile = effective.get(&node.host_profile).ok_or_else(|| {
                Error::processing(format!(
                    "BaremetalNode {} references undefined HostProfile {}",
                    node.name, node.host_profile
                ))
            })?;

            Ok(BaremetalNode {
                settings: node.settings.merged_over(profile),
                ..node.clone()
            })
        })
        .collect()
}

fn check_references(
    state: &DesignState,
    host_profiles: &[HostProfile],
    nodes: &[BaremetalNode],
    dangling: &mut Vec<String>,
) {
    let networks = state.networks();
    let links = state.network_links();
    let hardware = state.hardware_profiles();

    for network in networks.iter() {
        if let Some(link) = &network.network_link
            && !links.contains(link)
        {
            dangling.push(format!(
                "Network {} references undefined NetworkLink {}",
                network.name, link
            ));
        }
    }

    for link in links.iter() {
        for allowed in &link.allowed_networks {
            if !networks.contains(allowed) {
                dangling.push(format!(
                    "NetworkLink {} allows undefined Network {}",
                    link.name, allowed
                ));
            }
        }
        if let Some(default) = &link.trunking.default_network
            && !networks.contains(default)
        {
            dangling.push(format!(
                "NetworkLink {} has undefined default Network {}",
                link.name, default
            ));
        }
    }

    let hosts = host_profiles
        .iter()
        .map(|p| (EntityKind::HostProfile, p.name.as_str(), &p.settings))
        .chain(
            nodes
                .iter()
                .map(|n| (EntityKind::BaremetalNode, n.name.as_str(), &n.settings)),
        );

    for (kind, name, settings) in hosts {
        if let Some(hw) = &settings.hardware_profile
            && !hardware.contains(hw)
        {
            dangling.push(format!("{} {} references undefined HardwareProfile {}", kind, name, hw));
        }
        if let Some(primary) = &settings.primary_network
            && !networks.contains(primary)
        {
            dangling.push(format!("{} {} has undefined primary Network {}", kind, name, primary));
        }
        for iface in &settings.interfaces {
            if let Some(link) = &iface.network_link
                && !links.contains(link)
            {
                dangling.push(format!(
                    "{} {} interface {} references undefined NetworkLink {}",
                    kind, name, iface.device_name, link
                ));
            }
            for network in &iface.networks {
                if !networks.contains(network) {
                    dangling.push(format!(
                        "{} {} interface {} references undefined Network {}",
                        kind, name, iface.device_name, network
                    ));
                }
            }
        }
    }

    for node in nodes {
        for address in &node.addressing {
            if !networks.contains(&address.network) {
                dangling.push(format!(
                    "BaremetalNode {} has an address on undefined Network {}",
                    node.name, address.network
                ));
            }
        }
    }
}

/// Map each network to its carrying link
///
/// An explicit `network_link` wins; otherwise the first link, in declaration
/// order, that allows the network.
fn carrying_links(state: &DesignState, issues: &mut Vec<ResolutionIssue>) -> HashMap<String, String> {
    let mut carrying = HashMap::new();

    for network in state.networks().iter() {
        let link = network.network_link.clone().or_else(|| {
            state
                .network_links()
                .iter()
                .find(|l: &&NetworkLink| l.allowed_networks.contains(&network.name))
                .map(|l| l.name.clone())
        });

        match link {
            Some(link) => {
                carrying.insert(network.name.clone(), link);
            }
            None => issues.push(ResolutionIssue::entity(
                EntityKind::Network,
                &network.name,
                "not carried by any NetworkLink",
            )),
        }
    }

    carrying
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HardwareProfile, HostInterface, Network, Site};

    fn profile(name: &str, parent: Option<&str>, rack: Option<&str>, tags: &[&str]) -> HostProfile {
        let mut p = HostProfile::new(name);
        p.parent = parent.map(str::to_string);
        p.settings.rack = rack.map(str::to_string);
        p.settings.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    fn base_state() -> DesignState {
        let mut state = DesignState::new();
        state.add_site(Site::new("sitename"));
        state.add_network(Network::new("mgmt", "10.0.0.0/24".parse().unwrap()));
        state.add_network_link(NetworkLink::new("gp").allowing("mgmt"));
        state.add_hardware_profile(HardwareProfile::new("generic"));
        state
    }

    #[test]
    fn test_clean_resolution() {
        let (status, design) = resolve(base_state()).unwrap();

        assert!(status.is_clean());
        assert_eq!(design.site().map(|s| s.name.as_str()), Some("sitename"));
        assert_eq!(design.carrying_link("mgmt").map(|l| l.name.as_str()), Some("gp"));
        assert_eq!(design.entity_count(), 4);
    }

    #[test]
    fn test_inheritance_chain_depth_three() {
        let mut state = base_state();
        // Declared child-first to prove order doesn't matter
        state.add_host_profile(profile("leaf", Some("middle"), None, &["leaf", "!base"]));
        state.add_host_profile(profile("middle", Some("root"), Some("rack2"), &["middle"]));
        state.add_host_profile(profile("root", None, Some("rack1"), &["base"]));

        let (_, design) = resolve(state).unwrap();
        let leaf = design.host_profile("leaf").unwrap();

        assert_eq!(leaf.settings.rack.as_deref(), Some("rack2"));
        assert_eq!(leaf.settings.tags, vec!["middle", "leaf"]);
        assert_eq!(leaf.parent.as_deref(), Some("middle"));

        let root = design.host_profile("root").unwrap();
        assert_eq!(root.settings.rack.as_deref(), Some("rack1"));

        let order: Vec<_> = design.host_profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["leaf", "middle", "root"]);
    }

    #[test]
    fn test_inheritance_cycle_is_processing_error() {
        let mut state = base_state();
        state.add_host_profile(profile("a", Some("b"), None, &[]));
        state.add_host_profile(profile("b", Some("c"), None, &[]));
        state.add_host_profile(profile("c", Some("a"), None, &[]));

        let err = resolve(state).unwrap_err();
        assert!(err.is_processing());
        assert!(err.to_string().contains("a -> b -> c -> a"));
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let mut state = base_state();
        state.add_host_profile(profile("loop", Some("loop"), None, &[]));

        let err = resolve(state).unwrap_err();
        assert!(err.to_string().contains("loop -> loop"));
    }

    #[test]
    fn test_missing_parent_is_processing_error() {
        let mut state = base_state();
        state.add_host_profile(profile("orphan", Some("ghost"), None, &[]));

        let err = resolve(state).unwrap_err();
        assert!(err.is_processing());
        assert!(err.to_string().contains("orphan references undefined parent HostProfile ghost"));
    }

    #[test]
    fn test_node_inherits_profile() {
        let mut state = base_state();
        let mut p = profile("compute", None, Some("rack1"), &["compute"]);
        p.settings.hardware_profile = Some("generic".into());
        p.settings.interfaces = vec![HostInterface::new("eth0").on_link("gp").with_network("mgmt")];
        state.add_host_profile(p);

        let mut node = BaremetalNode::new("node01", "compute");
        node.settings.rack = Some("rack7".into());
        state.add_baremetal_node(node);

        let (status, design) = resolve(state).unwrap();
        assert!(status.is_clean());

        let node = design.baremetal_node("node01").unwrap();
        assert_eq!(node.settings.rack.as_deref(), Some("rack7"));
        assert_eq!(node.settings.hardware_profile.as_deref(), Some("generic"));
        assert_eq!(node.settings.interfaces.len(), 1);
    }

    #[test]
    fn test_node_without_profile_is_processing_error() {
        let mut state = base_state();
        state.add_baremetal_node(BaremetalNode::new("node01", "absent"));

        let err = resolve(state).unwrap_err();
        assert!(err.to_string().contains("node01 references undefined HostProfile absent"));
    }

    #[test]
    fn test_dangling_references_are_reported_together() {
        let mut state = base_state();
        state.add_network(Network::new("storage", "10.1.0.0/24".parse().unwrap()).with_link("missing"));
        state.add_network_link(NetworkLink::new("bad").allowing("nowhere"));

        let err = resolve(state).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Network storage references undefined NetworkLink missing"));
        assert!(text.contains("NetworkLink bad allows undefined Network nowhere"));
    }

    #[test]
    fn test_recoverable_issues() {
        let mut state = DesignState::new();
        state.add_network(Network::new("lonely", "10.9.0.0/24".parse().unwrap()));
        state.add_host_profile(HostProfile::new("bare"));
        state.add_baremetal_node(BaremetalNode::new("node01", "bare"));

        let (status, design) = resolve(state).unwrap();
        assert!(!status.is_clean());

        let messages: Vec<String> = status.issues().iter().map(|i| i.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("does not define a Site")));
        assert!(messages.iter().any(|m| m.contains("Network lonely")));
        assert!(messages.iter().any(|m| m.contains("BaremetalNode node01")));
        assert!(design.carrying_link("lonely").is_none());
    }

    #[test]
    fn test_several_sites_rejected() {
        let mut state = base_state();
        state.add_site(Site::new("other"));
        assert!(resolve(state).unwrap_err().is_processing());
    }

    #[test]
    fn test_explicit_link_beats_allowed_networks() {
        let mut state = base_state();
        state.add_network_link(NetworkLink::new("storage-link"));
        state.add_network(
            Network::new("mgmt", "10.0.0.0/24".parse().unwrap()).with_link("storage-link"),
        );

        let (_, design) = resolve(state).unwrap();
        assert_eq!(
            design.carrying_link("mgmt").map(|l| l.name.as_str()),
            Some("storage-link")
        );
    }
}
