//! Minimal embedding example for drydock-core
//!
//! This example wires a custom design source and a custom ingestion plugin
//! into the orchestrator, then validates the effective design. Nothing here
//! depends on the `drydock` binary or on YAML.

use drydock_core::model::{
    AddressAssignment, BaremetalNode, DesignEntity, HostProfile, Network, NetworkLink, Site,
};
use drydock_core::source::SourceRegistry;
use drydock_core::traits::{DesignSource, IngestParams, IngesterPlugin, IngesterPluginFactory};
use drydock_core::validator::has_errors;
use drydock_core::{Error, Ingester, Orchestrator, OrchestratorConfig, Result, Validator};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// In-process inventory keyed by the reference path
struct InventorySource {
    documents: HashMap<String, String>,
}

#[async_trait::async_trait]
impl DesignSource for InventorySource {
    fn scheme(&self) -> &str {
        "inventory"
    }

    async fn fetch(&self, design_ref: &Url) -> Result<String> {
        self.documents
            .get(design_ref.path())
            .cloned()
            .ok_or_else(|| Error::processing(format!("No inventory document at {}", design_ref)))
    }
}

/// Reads one entity per line:
///
/// ```text
/// site <name>
/// network <name> <cidr> <mtu>
/// link <name> <mtu> <network>[,<network>...]
/// profile <name>
/// node <name> <profile> [<network>=<address>...]
/// ```
struct LinePlugin;

impl LinePlugin {
    fn parse_line(line: &str) -> Result<DesignEntity> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let bad = || Error::processing(format!("Cannot parse inventory line '{}'", line));

        let entity = match fields.as_slice() {
            ["site", name] => Site::new(*name).into(),
            ["network", name, cidr, mtu] => Network::new(*name, cidr.parse()?)
                .with_mtu(mtu.parse().map_err(|_| bad())?)
                .into(),
            ["link", name, mtu, networks] => networks
                .split(',')
                .fold(
                    NetworkLink::new(*name).with_mtu(mtu.parse().map_err(|_| bad())?),
                    |link, network| link.allowing(network),
                )
                .into(),
            ["profile", name] => HostProfile::new(*name).into(),
            ["node", name, profile, addresses @ ..] => {
                let mut node = BaremetalNode::new(*name, *profile);
                for address in addresses {
                    let (network, ip) = address.split_once('=').ok_or_else(bad)?;
                    let assignment = match ip {
                        "dhcp" => AddressAssignment::Dhcp,
                        ip => AddressAssignment::Static(ip.parse().map_err(|_| bad())?),
                    };
                    node = node.with_address(network, assignment);
                }
                node.into()
            }
            _ => return Err(bad()),
        };

        Ok(entity)
    }
}

#[async_trait::async_trait]
impl IngesterPlugin for LinePlugin {
    fn name(&self) -> &str {
        "lines"
    }

    async fn ingest(&self, params: &IngestParams) -> Result<Vec<DesignEntity>> {
        let content = params
            .content
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("lines plugin needs document content"))?;

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Self::parse_line)
            .collect()
    }
}

const BASE: &str = "
site lab
network mgmt 10.23.1.0/24 1500
network storage 10.23.2.0/24 9000
link bond0 9000 mgmt,storage
profile defaults
node node01 defaults mgmt=10.23.1.10 storage=10.23.2.10
node node02 defaults mgmt=10.23.1.11 storage=dhcp
";

// Second node takes the first one's address and storage outgrows its link
const OVERLAY: &str = "
network storage 10.23.2.0/24 9216
node node02 defaults mgmt=10.23.1.10 storage=dhcp
";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    println!("=== Embedded drydock-core Example ===\n");

    println!("1. Registering the inventory source and line plugin...");
    let sources = SourceRegistry::new();
    sources.register_source(Arc::new(InventorySource {
        documents: HashMap::from([
            ("base".to_string(), BASE.to_string()),
            ("overlay".to_string(), OVERLAY.to_string()),
        ]),
    }));

    let ingester = Ingester::new();
    let factory = || -> Result<Box<dyn IngesterPlugin>> { Ok(Box::new(LinePlugin)) };
    let enabled = ingester.enable_plugins(vec![Box::new(factory) as Box<dyn IngesterPluginFactory>])?;
    println!("   Enabled plugins: {:?}", enabled);

    let orchestrator = Orchestrator::new(
        Arc::new(ingester),
        OrchestratorConfig::default().with_plugin("lines"),
    )?
    .with_sources(Arc::new(sources));

    println!("2. Resolving inventory:base alone...");
    let (status, design) = orchestrator.get_effective_site("inventory:base").await?;
    report(&status, &design, &Validator::new().run_all(&design));

    println!("\n3. Resolving inventory:base with inventory:overlay...");
    let (status, design) = orchestrator
        .get_effective_site_from(&["inventory:base", "inventory:overlay"])
        .await?;
    let messages = Validator::new()
        .run_all_concurrent(Arc::new(design.clone()))
        .await?;
    report(&status, &design, &messages);

    println!("\n=== Embedding Successful ===");
    Ok(())
}

fn report(
    status: &drydock_core::ResolutionStatus,
    design: &drydock_core::SiteDesign,
    messages: &[drydock_core::ValidationMessage],
) {
    println!("   {} entities, status {:?}", design.entity_count(), status);
    for message in messages.iter().filter(|m| m.error) {
        println!("   [error] {}", message.message);
    }
    println!("   valid: {}", !has_errors(messages));
}
