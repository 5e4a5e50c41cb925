use super::or_success;
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;

pub const NAME: &str = "unique_network_check";

/// Each network rides one link, and no two networks share address space
pub fn unique_network_check(design: &SiteDesign) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();

    for network in design.networks() {
        let carriers: Vec<&str> = design
            .network_links()
            .iter()
            .filter(|link| link.allowed_networks.contains(&network.name))
            .map(|link| link.name.as_str())
            .collect();

        if let [first, rest @ ..] = carriers.as_slice() {
            for other in rest {
                messages.push(ValidationMessage::error(
                    format!(
                        "Unique Network Error: Allowed network {} duplicated on NetworkLink {} and NetworkLink {}",
                        network.name, first, other
                    ),
                    EntityKind::Network,
                    &network.name,
                ));
            }
        }
    }

    let networks = design.networks();
    for (pos, network) in networks.iter().enumerate() {
        for other in &networks[pos + 1..] {
            if network.cidr.overlaps(&other.cidr) {
                messages.push(ValidationMessage::error(
                    format!(
                        "Unique Network Error: Network {} ({}) overlaps Network {} ({})",
                        network.name, network.cidr, other.name, other.cidr
                    ),
                    EntityKind::Network,
                    &other.name,
                ));
            }
        }
    }

    or_success(messages, "Unique Network")
}
