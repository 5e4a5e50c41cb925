//! Site design validation
//!
//! A [`Validator`] holds a registry of named [`ValidationRule`]s and runs them
//! against a frozen [`SiteDesign`]. Rules never fail: findings are
//! [`ValidationMessage`] values. A rule with nothing to report emits exactly
//! one success message carrying its label.
//!
//! ## Ordering
//!
//! Rules run in rule-name order and each rule reports in declaration order,
//! so the same design always yields the same message sequence, whether the
//! rules ran sequentially or on tokio tasks.

pub mod rules;

use crate::error::{Error, Result};
use crate::model::EntityKind;
use crate::orchestrator::SiteDesign;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug};

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub message: String,

    /// `false` for a rule's success message
    pub error: bool,

    /// Entity the finding is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
}

impl ValidationMessage {
    /// A violation concerning one entity
    pub fn error(message: impl Into<String>, kind: EntityKind, name: &str) -> Self {
        Self {
            message: message.into(),
            error: true,
            name: Some(name.to_string()),
            kind: Some(kind),
        }
    }

    /// The single message of a rule that found nothing
    pub fn success(label: impl Into<String>) -> Self {
        Self {
            message: label.into(),
            error: false,
            name: None,
            kind: None,
        }
    }

    /// Wire mapping: `message` and `error`, plus `name`/`kind` when set
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("message".to_string(), Value::String(self.message.clone()));
        map.insert("error".to_string(), Value::Bool(self.error));
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(kind) = self.kind {
            map.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
        }
        map
    }
}

/// True when any message is an error
pub fn has_errors(messages: &[ValidationMessage]) -> bool {
    messages.iter().any(|m| m.error)
}

/// A named check over a site design
///
/// Implementations must be pure: same design in, same messages out.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn validate(&self, design: &SiteDesign) -> Vec<ValidationMessage>;
}

/// Signature of a rule written as a plain function
pub type RuleFn = fn(&SiteDesign) -> Vec<ValidationMessage>;

/// A plain function registered under a name
#[derive(Debug, Clone, Copy)]
pub struct FnRule {
    name: &'static str,
    check: RuleFn,
}

impl FnRule {
    pub const fn new(name: &'static str, check: RuleFn) -> Self {
        Self { name, check }
    }
}

impl ValidationRule for FnRule {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, design: &SiteDesign) -> Vec<ValidationMessage> {
        (self.check)(design)
    }
}

/// Registry of validation rules
///
/// ## Thread Safety
///
/// Rules are looked up behind an RwLock; running takes a snapshot of the
/// registry so registration never blocks on a running validation.
pub struct Validator {
    rules: RwLock<BTreeMap<String, Arc<dyn ValidationRule>>>,
    span: Span,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a validator with every built-in rule registered
    pub fn new() -> Self {
        let validator = Self::empty();
        for rule in rules::builtin() {
            validator.register(Arc::new(rule));
        }
        validator
    }

    /// Create a validator with no rules
    pub fn empty() -> Self {
        Self {
            rules: RwLock::new(BTreeMap::new()),
            span: tracing::info_span!("validator"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Register a rule under its name, replacing any rule of the same name
    pub fn register(&self, rule: Arc<dyn ValidationRule>) {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        rules.insert(rule.name().to_string(), rule);
    }

    /// Registered rule names, sorted
    pub fn rule_names(&self) -> Vec<String> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules.keys().cloned().collect()
    }

    fn rule(&self, name: &str) -> Result<Arc<dyn ValidationRule>> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules
            .get(name)
            .cloned()
            .ok_or_else(|| Error::lookup(format!("Could not find validation rule {}", name)))
    }

    fn snapshot(&self) -> Vec<Arc<dyn ValidationRule>> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules.values().cloned().collect()
    }

    /// Run one rule by name
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ValidationMessage>)`: The rule's findings
    /// - `Err(Error::Lookup)`: No rule of that name
    pub fn run(&self, name: &str, design: &SiteDesign) -> Result<Vec<ValidationMessage>> {
        let _entered = self.span.enter();
        let rule = self.rule(name)?;
        let messages = rule.validate(design);
        debug!("Rule {} produced {} message(s)", name, messages.len());
        Ok(messages)
    }

    /// Run the named rules, in rule-name order
    ///
    /// Every name is checked before any rule runs.
    pub fn run_selected<S: AsRef<str>>(&self, names: &[S], design: &SiteDesign) -> Result<Vec<ValidationMessage>> {
        let mut selected = names
            .iter()
            .map(|n| self.rule(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        selected.sort_by(|a, b| a.name().cmp(b.name()));
        selected.dedup_by(|a, b| a.name() == b.name());

        let _entered = self.span.enter();
        Ok(selected.iter().flat_map(|rule| rule.validate(design)).collect())
    }

    /// Run every registered rule sequentially, in rule-name order
    pub fn run_all(&self, design: &SiteDesign) -> Vec<ValidationMessage> {
        let _entered = self.span.enter();
        let rules = self.snapshot();
        debug!("Running {} validation rule(s)", rules.len());
        rules.iter().flat_map(|rule| rule.validate(design)).collect()
    }

    /// Run every registered rule on its own tokio task
    ///
    /// Output is identical to [`Validator::run_all`].
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ValidationMessage>)`: Messages merged in rule-name order
    /// - `Err(Error::Processing)`: A rule task panicked
    pub async fn run_all_concurrent(&self, design: Arc<SiteDesign>) -> Result<Vec<ValidationMessage>> {
        let mut tasks = JoinSet::new();

        for rule in self.snapshot() {
            let design = Arc::clone(&design);
            let span = self.span.clone();
            tasks.spawn(
                async move { (rule.name().to_string(), rule.validate(&design)) }.instrument(span),
            );
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| Error::processing(format!("Validation task failed: {}", e)))?;
            results.push(outcome);
        }

        // Tasks finish in any order; the sort is stable within one rule
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results.into_iter().flat_map(|(_, messages)| messages).collect())
    }

    /// Network MTU bounds and link ceilings
    pub fn mtu_rational(design: &SiteDesign) -> Vec<ValidationMessage> {
        rules::mtu::mtu_rational(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, NetworkLink, Site};
    use crate::state::DesignState;

    fn design() -> SiteDesign {
        let mut state = DesignState::new();
        state.add_site(Site::new("site"));
        state.add_network(Network::new("mgmt", "10.0.0.0/24".parse().unwrap()).with_mtu(900));
        state.add_network_link(NetworkLink::new("gp").allowing("mgmt"));
        state.finalize().unwrap().1
    }

    fn always_fails(_design: &SiteDesign) -> Vec<ValidationMessage> {
        vec![ValidationMessage::error("broken", EntityKind::Site, "site")]
    }

    #[test]
    fn test_message_wire_shape() {
        let success = ValidationMessage::success("Mtu");
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Mtu", "error": false}));
        assert_eq!(Value::Object(success.to_map()), json);

        let error = ValidationMessage::error("bad", EntityKind::Network, "mgmt");
        let map = error.to_map();
        assert_eq!(map.get("kind"), Some(&Value::String("Network".into())));
        assert_eq!(Value::Object(map), serde_json::to_value(&error).unwrap());
    }

    #[test]
    fn test_unknown_rule_is_lookup_error() {
        let err = Validator::new().run("no_such_rule", &design()).unwrap_err();
        assert!(err.is_lookup());
        assert!(err.to_string().contains("no_such_rule"));
    }

    #[test]
    fn test_fn_rules_register_by_name() {
        let validator = Validator::empty();
        validator.register(Arc::new(FnRule::new("always_fails", always_fails)));

        assert_eq!(validator.rule_names(), vec!["always_fails"]);
        let messages = validator.run("always_fails", &design()).unwrap();
        assert!(has_errors(&messages));
    }

    #[test]
    fn test_run_selected_checks_names_first() {
        let validator = Validator::new();
        let err = validator
            .run_selected(&["mtu_rational", "missing"], &design())
            .unwrap_err();
        assert!(err.is_lookup());

        let messages = validator
            .run_selected(&["mtu_rational", "mtu_rational"], &design())
            .unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_builtin_rules_registered() {
        assert_eq!(
            Validator::new().rule_names(),
            vec![
                "hostname_validity",
                "ip_locality_check",
                "mtu_rational",
                "network_trunking_rational",
                "no_duplicate_ips_check",
                "unique_network_check",
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let validator = Validator::new();
        let design = Arc::new(design());

        let sequential = validator.run_all(&design);
        for _ in 0..5 {
            let concurrent = validator.run_all_concurrent(Arc::clone(&design)).await.unwrap();
            assert_eq!(concurrent, sequential);
        }
    }
}
