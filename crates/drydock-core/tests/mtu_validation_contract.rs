//! Contract Test: MTU Validation
//!
//! This test verifies the `mtu_rational` rule end to end: documents are
//! ingested through a plugin, resolved by the orchestrator and validated.
//!
//! Constraints verified:
//! - A valid design yields exactly one `Mtu` success message
//! - Two networks each violating both constraints yield exactly four errors
//! - Rule output is deterministic, sequential or concurrent
//!
//! If this test fails, MTU validation is broken.

mod common;

use common::*;
use drydock_core::model::{DesignEntity, NetworkLink};
use drydock_core::traits::IngesterPluginFactory;
use drydock_core::validator::has_errors;
use drydock_core::{DesignState, Ingester, IngestParams, SiteDesign, Validator};
use std::sync::Arc;

const BOUNDS_TEMPLATE: &str = "Mtu Error: Mtu must be between 1400 and 64000; on Network ";
const LINK_TEMPLATE: &str = "Mtu Error: Mtu must be <= the parent Network Link; for Network ";

async fn resolve(entities: Vec<DesignEntity>) -> SiteDesign {
    let ingester = Ingester::new();
    ingester
        .enable_plugins(vec![Box::new(CannedFactory::new("canned", entities)) as Box<dyn IngesterPluginFactory>])
        .expect("plugin enabled");

    let mut state = DesignState::new();
    ingester
        .ingest_data("canned", Some(&mut state), &IngestParams::default())
        .await
        .expect("ingest succeeds");

    state.finalize().expect("design resolves").1
}

#[tokio::test]
async fn valid_design_yields_single_success() {
    let design = resolve(minimal_site(1500, 9000)).await;

    let messages = Validator::mtu_rational(&design);

    assert_eq!(messages.len(), 1);
    let msg = messages[0].to_map();
    assert_eq!(msg.get("message").and_then(|v| v.as_str()), Some("Mtu"));
    assert_eq!(msg.get("error").and_then(|v| v.as_bool()), Some(false));
}

#[tokio::test]
async fn invalid_design_yields_four_errors() {
    // Both networks exceed 64000 and their 9000-byte link
    let design = resolve(minimal_site(65536, 9000)).await;

    let messages = Validator::mtu_rational(&design);

    assert_eq!(messages.len(), 4, "got {:?}", messages);
    for msg in &messages {
        assert!(msg.error);
        assert!(
            msg.message.starts_with(BOUNDS_TEMPLATE) || msg.message.starts_with(LINK_TEMPLATE),
            "unexpected message: {}",
            msg.message
        );
    }
    assert_eq!(
        messages.iter().filter(|m| m.message.starts_with(BOUNDS_TEMPLATE)).count(),
        2
    );
}

#[tokio::test]
async fn below_minimum_only_breaks_bounds() {
    let mut entities = minimal_site(1500, 1500);
    entities.push(network("oob", "192.168.0.0/24", 1280).into());
    entities.push(NetworkLink::new("oob-link").with_mtu(1500).allowing("oob").into());

    let design = resolve(entities).await;
    let messages = Validator::mtu_rational(&design);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, format!("{}oob", BOUNDS_TEMPLATE));
}

#[tokio::test]
async fn rule_output_is_deterministic() {
    let design = Arc::new(resolve(minimal_site(65536, 9000)).await);
    let validator = Validator::new();

    let first = validator.run("mtu_rational", &design).unwrap();
    let again = validator.run("mtu_rational", &design).unwrap();
    assert_eq!(first, again);

    let sequential = validator.run_all(&design);
    let concurrent = validator.run_all_concurrent(Arc::clone(&design)).await.unwrap();
    assert_eq!(sequential, concurrent);
    assert!(has_errors(&sequential));

    // Rule-name order: mtu_rational comes after ip_locality_check
    let mtu_start = sequential
        .iter()
        .position(|m| m.message.starts_with("Mtu Error"))
        .unwrap();
    let locality = sequential.iter().position(|m| m.message == "IP Locality").unwrap();
    assert!(locality < mtu_start);
}
