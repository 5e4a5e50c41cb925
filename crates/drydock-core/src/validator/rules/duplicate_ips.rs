use super::or_success;
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;
use std::collections::HashMap;
use std::net::IpAddr;

pub const NAME: &str = "no_duplicate_ips_check";

/// No static address is assigned to two different nodes
pub fn no_duplicate_ips_check(design: &SiteDesign) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();
    let mut owners: HashMap<IpAddr, &str> = HashMap::new();

    for node in design.baremetal_nodes() {
        for ip in node.addressing.iter().filter_map(|a| a.address.static_ip()) {
            match owners.get(&ip) {
                Some(&owner) if owner != node.name => {
                    messages.push(ValidationMessage::error(
                        format!(
                            "Duplicate IP Error: Address {} is already assigned to BaremetalNode {}; on BaremetalNode {}",
                            ip, owner, node.name
                        ),
                        EntityKind::BaremetalNode,
                        &node.name,
                    ));
                }
                Some(_) => {}
                None => {
                    owners.insert(ip, &node.name);
                }
            }
        }
    }

    or_success(messages, "No Duplicate IPs")
}
