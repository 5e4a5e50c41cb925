use super::or_success;
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;

pub const NAME: &str = "ip_locality_check";

/// Static node addresses and route gateways lie inside their network
pub fn ip_locality_check(design: &SiteDesign) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();

    for network in design.networks() {
        for route in &network.routes {
            if !network.cidr.contains(route.gateway) {
                messages.push(ValidationMessage::error(
                    format!(
                        "IP Locality Error: Gateway {} for route {} is not within CIDR {}; on Network {}",
                        route.gateway, route.subnet, network.cidr, network.name
                    ),
                    EntityKind::Network,
                    &network.name,
                ));
            }
        }
    }

    for node in design.baremetal_nodes() {
        for address in &node.addressing {
            let Some(ip) = address.address.static_ip() else {
                continue;
            };
            let Some(network) = design.network(&address.network) else {
                continue;
            };

            if !network.cidr.contains(ip) {
                messages.push(ValidationMessage::error(
                    format!(
                        "IP Locality Error: Address {} is not within CIDR {} of Network {}; on BaremetalNode {}",
                        ip, network.cidr, network.name, node.name
                    ),
                    EntityKind::BaremetalNode,
                    &node.name,
                ));
            }
        }
    }

    or_success(messages, "IP Locality")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AddressAssignment, BaremetalNode, HostProfile, Network, NetworkRoute};
    use crate::validator::rules::fixtures::{design, messages};

    fn mgmt(gateway: &str) -> Network {
        let mut network = Network::new("mgmt", "10.0.0.0/24".parse().unwrap());
        network.routes.push(NetworkRoute {
            subnet: "0.0.0.0/0".parse().unwrap(),
            gateway: gateway.parse().unwrap(),
            metric: None,
        });
        network
    }

    fn node(name: &str, address: &str) -> BaremetalNode {
        BaremetalNode::new(name, "default")
            .with_address("mgmt", AddressAssignment::try_from(address.to_string()).unwrap())
    }

    #[test]
    fn test_local_addresses_pass() {
        let d = design(vec![
            mgmt("10.0.0.1").into(),
            HostProfile::new("default").into(),
            node("node01", "10.0.0.11").into(),
            node("node02", "dhcp").into(),
        ]);

        assert_eq!(ip_locality_check(&d), vec![ValidationMessage::success("IP Locality")]);
    }

    #[test]
    fn test_foreign_gateway_and_address() {
        let d = design(vec![
            mgmt("10.9.9.1").into(),
            HostProfile::new("default").into(),
            node("node01", "172.16.0.5").into(),
        ]);

        assert_eq!(
            messages(&ip_locality_check(&d)),
            vec![
                "IP Locality Error: Gateway 10.9.9.1 for route 0.0.0.0/0 is not within CIDR 10.0.0.0/24; on Network mgmt",
                "IP Locality Error: Address 172.16.0.5 is not within CIDR 10.0.0.0/24 of Network mgmt; on BaremetalNode node01",
            ]
        );
    }
}
