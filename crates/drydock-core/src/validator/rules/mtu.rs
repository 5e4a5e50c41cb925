use super::or_success;
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;

pub const NAME: &str = "mtu_rational";

const MIN_MTU: u32 = 1400;
const MAX_MTU: u32 = 64000;

/// Check every network's MTU against the allowed range and its carrying link
///
/// A network can violate both constraints and then yields two messages.
/// Link MTUs are not range-checked.
pub fn mtu_rational(design: &SiteDesign) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();

    for network in design.networks() {
        if !(MIN_MTU..=MAX_MTU).contains(&network.mtu) {
            messages.push(ValidationMessage::error(
                format!(
                    "Mtu Error: Mtu must be between {} and {}; on Network {}",
                    MIN_MTU, MAX_MTU, network.name
                ),
                EntityKind::Network,
                &network.name,
            ));
        }

        if let Some(link) = design.carrying_link(&network.name)
            && network.mtu > link.mtu
        {
            messages.push(ValidationMessage::error(
                format!(
                    "Mtu Error: Mtu must be <= the parent Network Link; for Network {}",
                    network.name
                ),
                EntityKind::Network,
                &network.name,
            ));
        }
    }

    or_success(messages, "Mtu")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, NetworkLink};
    use crate::validator::rules::fixtures::{design, messages};

    fn net(name: &str, mtu: u32) -> Network {
        Network::new(name, "10.0.0.0/24".parse().unwrap()).with_mtu(mtu)
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let d = design(vec![
            net("low", 1400).into(),
            net("high", 64000).into(),
            NetworkLink::new("jumbo").with_mtu(64000).allowing("low").allowing("high").into(),
        ]);

        let found = mtu_rational(&d);
        assert_eq!(found, vec![ValidationMessage::success("Mtu")]);
    }

    #[test]
    fn test_network_above_link() {
        let d = design(vec![
            net("storage", 9000).into(),
            NetworkLink::new("gp").with_mtu(1500).allowing("storage").into(),
        ]);

        assert_eq!(
            messages(&mtu_rational(&d)),
            vec!["Mtu Error: Mtu must be <= the parent Network Link; for Network storage"]
        );
    }

    #[test]
    fn test_out_of_range_without_link() {
        let d = design(vec![net("tiny", 576).into()]);

        let found = mtu_rational(&d);
        assert_eq!(
            messages(&found),
            vec!["Mtu Error: Mtu must be between 1400 and 64000; on Network tiny"]
        );
        assert_eq!(found[0].kind, Some(EntityKind::Network));
        assert_eq!(found[0].name.as_deref(), Some("tiny"));
    }

    #[test]
    fn test_both_violations_in_declaration_order() {
        let d = design(vec![
            net("b", 65000).into(),
            net("a", 70000).into(),
            NetworkLink::new("gp").with_mtu(9000).allowing("a").allowing("b").into(),
        ]);

        assert_eq!(
            messages(&mtu_rational(&d)),
            vec![
                "Mtu Error: Mtu must be between 1400 and 64000; on Network b",
                "Mtu Error: Mtu must be <= the parent Network Link; for Network b",
                "Mtu Error: Mtu must be between 1400 and 64000; on Network a",
                "Mtu Error: Mtu must be <= the parent Network Link; for Network a",
            ]
        );
    }

    #[test]
    fn test_empty_design_is_success() {
        let d = design(vec![]);
        assert_eq!(mtu_rational(&d), vec![ValidationMessage::success("Mtu")]);
    }
}
