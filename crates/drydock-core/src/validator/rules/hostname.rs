use super::or_success;
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use crate::validator::ValidationMessage;

pub const NAME: &str = "hostname_validity";

/// Node names are usable as RFC 1123 host names
pub fn hostname_validity(design: &SiteDesign) -> Vec<ValidationMessage> {
    let messages = design
        .baremetal_nodes()
        .iter()
        .filter_map(|node| {
            check_hostname(&node.name).err().map(|reason| {
                ValidationMessage::error(
                    format!("Hostname Error: {}; on BaremetalNode {}", reason, node.name),
                    EntityKind::BaremetalNode,
                    &node.name,
                )
            })
        })
        .collect();

    or_success(messages, "Hostname Validity")
}

fn check_hostname(hostname: &str) -> Result<(), String> {
    if hostname.is_empty() {
        return Err("Hostname cannot be empty".to_string());
    }

    // RFC 1035: 253 chars max
    if hostname.len() > 253 {
        return Err(format!("Hostname too long: {} chars (max 253)", hostname.len()));
    }

    for label in hostname.split('.') {
        if label.is_empty() {
            return Err("Hostname has an empty label".to_string());
        }

        if label.len() > 63 {
            return Err(format!("Label '{}' too long: {} chars (max 63)", label, label.len()));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!(
                "Label '{}' contains invalid characters (letters, digits and hyphen only)",
                label
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("Label '{}' cannot start or end with a hyphen", label));
        }
    }

    Ok(())
}
