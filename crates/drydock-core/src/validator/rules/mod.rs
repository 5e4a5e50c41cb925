//! Built-in validation rules
//!
//! Every rule reports violations in declaration order, or a single success
//! message carrying its label when it finds nothing.

pub mod duplicate_ips;
pub mod hostname;
pub mod ip_locality;
pub mod mtu;
pub mod trunking;
pub mod unique_network;

use super::{FnRule, ValidationMessage};

/// Every built-in rule
pub fn builtin() -> Vec<FnRule> {
    vec![
        FnRule::new(mtu::NAME, mtu::mtu_rational),
        FnRule::new(unique_network::NAME, unique_network::unique_network_check),
        FnRule::new(trunking::NAME, trunking::network_trunking_rational),
        FnRule::new(ip_locality::NAME, ip_locality::ip_locality_check),
        FnRule::new(duplicate_ips::NAME, duplicate_ips::no_duplicate_ips_check),
        FnRule::new(hostname::NAME, hostname::hostname_validity),
    ]
}

/// Violations as found, or the rule's success message
fn or_success(messages: Vec<ValidationMessage>, label: &str) -> Vec<ValidationMessage> {
    if messages.is_empty() {
        vec![ValidationMessage::success(label)]
    } else {
        messages
    }
}
