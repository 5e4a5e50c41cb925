// # drydock - Site Design CLI
//
// The drydock binary is a thin shell over drydock-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Enabling ingestion plugins
// 4. Resolving the effective site design and running validation rules
// 5. Printing a JSON report on stdout
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DRYDOCK_DESIGN_REF`: Design reference URI(s), comma-separated (required)
// - `DRYDOCK_PLUGIN`: Ingestion plugin name (default: yaml)
// - `DRYDOCK_RULES`: Comma-separated rule names (default: every rule)
// - `DRYDOCK_UNRECOGNIZED`: drop, warn or reject (default: warn)
// - `DRYDOCK_RESOLVE_TIMEOUT_SECS`: Resolution time budget, 0 disables (default: 300)
// - `DRYDOCK_FAIL_ON_ERROR`: Exit non-zero on validation errors (default: true)
// - `DRYDOCK_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export DRYDOCK_DESIGN_REF=file:///etc/drydock/site.yaml
// export DRYDOCK_RULES=mtu_rational,unique_network_check
//
// drydock
// ```

use anyhow::Result;
use drydock_core::validator::has_errors;
use drydock_core::{
    DrydockConfig, Ingester, Orchestrator, ResolutionStatus, UnrecognizedPolicy, Validator,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different outcomes
///
/// - 0: Design resolved and validated clean
/// - 1: Configuration error
/// - 2: Runtime or resolution error
/// - 3: Validation found errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrydockExitCode {
    /// Design is valid
    Clean = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Ingestion or resolution failed
    RuntimeError = 2,
    /// At least one rule reported an error
    ValidationFailed = 3,
}

impl From<DrydockExitCode> for ExitCode {
    fn from(code: DrydockExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    design_refs: Vec<String>,
    drydock: DrydockConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut drydock = DrydockConfig::new();

        if let Some(plugin) = lookup("DRYDOCK_PLUGIN") {
            drydock.orchestrator.plugin = plugin.trim().to_string();
        }

        if let Some(policy) = lookup("DRYDOCK_UNRECOGNIZED") {
            drydock.ingester.unrecognized = policy
                .parse::<UnrecognizedPolicy>()
                .map_err(|e| anyhow::anyhow!("DRYDOCK_UNRECOGNIZED: {}", e))?;
        }

        if let Some(secs) = lookup("DRYDOCK_RESOLVE_TIMEOUT_SECS") {
            drydock.orchestrator.resolve_timeout_secs = secs.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "DRYDOCK_RESOLVE_TIMEOUT_SECS must be a whole number of seconds. Got: {}",
                    secs
                )
            })?;
        }

        drydock.validator.rules = split_list(lookup("DRYDOCK_RULES"));

        if let Some(flag) = lookup("DRYDOCK_FAIL_ON_ERROR") {
            drydock.validator.fail_on_error = match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => anyhow::bail!("DRYDOCK_FAIL_ON_ERROR must be true or false. Got: {}", flag),
            };
        }

        Ok(Self {
            design_refs: split_list(lookup("DRYDOCK_DESIGN_REF")),
            drydock,
            log_level: lookup("DRYDOCK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Rule names are checked against the built-in rules so a typo fails
    /// before any document is read.
    fn validate(&self) -> Result<()> {
        if self.design_refs.is_empty() {
            anyhow::bail!(
                "DRYDOCK_DESIGN_REF is required. \
                Set it via: export DRYDOCK_DESIGN_REF=file:///path/to/site.yaml"
            );
        }

        for design_ref in &self.design_refs {
            if !design_ref.contains(':') {
                anyhow::bail!(
                    "DRYDOCK_DESIGN_REF entries must be URIs (e.g. file:///path/to/site.yaml). Got: {}",
                    design_ref
                );
            }
        }

        self.drydock.validate()?;

        let known = Validator::new().rule_names();
        for rule in &self.drydock.validator.rules {
            if !known.contains(rule) {
                anyhow::bail!(
                    "DRYDOCK_RULES names unknown rule '{}'. Known rules: {}",
                    rule,
                    known.join(", ")
                );
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DRYDOCK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DrydockExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DrydockExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DrydockExitCode::ConfigError.into();
    }

    info!("Resolving {} design reference(s)", config.design_refs.len());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DrydockExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        tokio::select! {
            outcome = run(config) => match outcome {
                Ok(code) => code,
                Err(e) => {
                    error!("{}", e);
                    exit_code_for(&e)
                }
            },

            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, abandoning resolution");
                DrydockExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Configuration problems surfacing from the core keep their exit code
fn exit_code_for(error: &anyhow::Error) -> DrydockExitCode {
    match error.downcast_ref::<drydock_core::Error>() {
        Some(e) if e.is_config() || e.is_lookup() => DrydockExitCode::ConfigError,
        _ => DrydockExitCode::RuntimeError,
    }
}

/// Resolve, validate and report
async fn run(config: Config) -> Result<DrydockExitCode> {
    let ingester = Ingester::with_config(&config.drydock.ingester);
    enable_plugins(&ingester)?;

    let orchestrator = Orchestrator::new(Arc::new(ingester), config.drydock.orchestrator.clone())?;
    let (status, design) = orchestrator.get_effective_site_from(&config.design_refs).await?;

    if let ResolutionStatus::ResolvedWithIssues(issues) = &status {
        warn!("Design resolved with {} issue(s)", issues.len());
    }

    let design = Arc::new(design);
    let validator = Validator::new();
    let messages = if config.drydock.validator.rules.is_empty() {
        validator.run_all_concurrent(Arc::clone(&design)).await?
    } else {
        validator.run_selected(&config.drydock.validator.rules, &design)?
    };

    let failed = has_errors(&messages);
    let report = serde_json::json!({
        "design_refs": config.design_refs,
        "status": status,
        "entity_count": design.entity_count(),
        "resolved_at": design.resolved_at().to_rfc3339(),
        "valid": !failed,
        "messages": messages.iter().map(|m| m.to_map()).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if failed {
        let errors = messages.iter().filter(|m| m.error).count();
        warn!("Validation reported {} error(s)", errors);
        if config.drydock.validator.fail_on_error {
            return Ok(DrydockExitCode::ValidationFailed);
        }
    } else {
        info!("Design is valid");
    }

    Ok(DrydockExitCode::Clean)
}

#[cfg(feature = "yaml")]
fn enable_plugins(ingester: &Ingester) -> Result<()> {
    info!("Enabling YAML ingestion plugin");
    drydock_ingester_yaml::register(ingester)?;
    Ok(())
}

#[cfg(not(feature = "yaml"))]
fn enable_plugins(_ingester: &Ingester) -> Result<()> {
    anyhow::bail!("No ingestion plugin compiled in; rebuild with the `yaml` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DRYDOCK_DESIGN_REF", "file:///tmp/site.yaml")]).unwrap();

        assert_eq!(config.design_refs, vec!["file:///tmp/site.yaml"]);
        assert_eq!(config.drydock.orchestrator.plugin, "yaml");
        assert_eq!(config.drydock.orchestrator.resolve_timeout_secs, 300);
        assert_eq!(config.drydock.ingester.unrecognized, UnrecognizedPolicy::Warn);
        assert!(config.drydock.validator.rules.is_empty());
        assert!(config.drydock.validator.fail_on_error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lists_are_split_and_trimmed() {
        let config = config(&[
            ("DRYDOCK_DESIGN_REF", "file:///a.yaml, file:///b.yaml,"),
            ("DRYDOCK_RULES", "mtu_rational , hostname_validity"),
        ])
        .unwrap();

        assert_eq!(config.design_refs, vec!["file:///a.yaml", "file:///b.yaml"]);
        assert_eq!(config.drydock.validator.rules, vec!["mtu_rational", "hostname_validity"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_design_ref_rejected() {
        assert!(config(&[]).unwrap().validate().is_err());
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let config = config(&[
            ("DRYDOCK_DESIGN_REF", "file:///tmp/site.yaml"),
            ("DRYDOCK_RULES", "mtu_rationale"),
        ])
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mtu_rationale"));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(config(&[("DRYDOCK_UNRECOGNIZED", "explode")]).is_err());
        assert!(config(&[("DRYDOCK_RESOLVE_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config(&[("DRYDOCK_FAIL_ON_ERROR", "maybe")]).is_err());

        let config = config(&[
            ("DRYDOCK_DESIGN_REF", "file:///tmp/site.yaml"),
            ("DRYDOCK_LOG_LEVEL", "verbose"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exit_code_for_core_errors() {
        let config_err = anyhow::Error::from(drydock_core::Error::config("bad scheme"));
        assert_eq!(exit_code_for(&config_err), DrydockExitCode::ConfigError);

        let processing = anyhow::Error::from(drydock_core::Error::processing("cycle"));
        assert_eq!(exit_code_for(&processing), DrydockExitCode::RuntimeError);
    }
}
