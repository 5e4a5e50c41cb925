use super::or_success;
use crate::model::{EntityKind, TrunkMode};
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;

pub const NAME: &str = "network_trunking_rational";

/// Links without trunking carry one network; a trunk's default network is one it allows
pub fn network_trunking_rational(design: &SiteDesign) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();

    for link in design.network_links() {
        if link.trunking.mode == TrunkMode::Disabled && link.allowed_networks.len() > 1 {
            messages.push(ValidationMessage::error(
                format!(
                    "Network Trunking Error: Trunking is disabled but {} networks are allowed; on NetworkLink {}",
                    link.allowed_networks.len(),
                    link.name
                ),
                EntityKind::NetworkLink,
                &link.name,
            ));
        }

        if let Some(default) = &link.trunking.default_network
            && !link.allowed_networks.contains(default)
        {
            messages.push(ValidationMessage::error(
                format!(
                    "Network Trunking Error: Default network {} is not an allowed network; on NetworkLink {}",
                    default, link.name
                ),
                EntityKind::NetworkLink,
                &link.name,
            ));
        }
    }

    or_success(messages, "Network Trunking")
}
