// # YAML Ingester Plugin
//
// This crate provides the `yaml` ingestion plugin for Drydock site designs.
//
// ## Document Format
//
// A design is a multi-document YAML stream. Each document carries one entity:
//
// ```yaml
// ---
// apiVersion: 'drydock/v1'
// kind: Network
// metadata:
//   name: mgmt
//   region: sitename
// spec:
//   cidr: 172.16.1.0/24
//   mtu: 1500
// ```
//
// `metadata.name` becomes the entity name; `spec` holds its fields. `Region`
// and `Site` both produce the site entity. Documents with another apiVersion
// belong to other consumers and are skipped. Kinds this plugin does not know
// are handed to the ingester as unrecognized entities.

use drydock_core::model::{
    BaremetalNode, DesignEntity, HardwareProfile, HostProfile, Network, NetworkLink, Site,
};
use drydock_core::traits::{IngestParams, IngesterPlugin, IngesterPluginFactory};
use drydock_core::{Error, Ingester, Result};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// Name the plugin registers under
pub const PLUGIN_NAME: &str = "yaml";

/// Document schema version this plugin reads
pub const API_VERSION: &str = "drydock/v1";

#[derive(Debug, Deserialize)]
struct Document {
    kind: String,
    metadata: Metadata,
    #[serde(default)]
    spec: Value,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
}

/// Ingestion plugin for `drydock/v1` YAML documents
///
/// Reads `IngestParams::content` when present, otherwise every file in
/// `IngestParams::filenames` in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlIngester;

impl YamlIngester {
    pub fn new() -> Self {
        Self
    }

    /// Parse one YAML stream into entities, in document order
    ///
    /// # Parameters
    ///
    /// - `text`: The YAML stream
    /// - `origin`: Where the text came from, for error messages
    pub fn parse(&self, text: &str, origin: &str) -> Result<Vec<DesignEntity>> {
        let mut entities = Vec::new();

        for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let value = Value::deserialize(document).map_err(|e| {
                Error::processing(format!("Malformed YAML in {} (document {}): {}", origin, index + 1, e))
            })?;

            if value.is_null() {
                continue;
            }

            let api_version = value.get("apiVersion").and_then(Value::as_str);
            if api_version != Some(API_VERSION) {
                tracing::debug!(
                    "Skipping document {} in {} with apiVersion {:?}",
                    index + 1,
                    origin,
                    api_version
                );
                continue;
            }

            let document: Document = serde_yaml::from_value(value).map_err(|e| {
                Error::processing(format!("Invalid document {} in {}: {}", index + 1, origin, e))
            })?;

            entities.push(to_entity(document, origin)?);
        }

        tracing::debug!("Parsed {} entities from {}", entities.len(), origin);
        Ok(entities)
    }
}

fn to_entity(document: Document, origin: &str) -> Result<DesignEntity> {
    let Document { kind, metadata, spec } = document;
    let name = metadata.name;

    let mut spec = match spec {
        Value::Mapping(spec) => spec,
        Value::Null => Mapping::new(),
        _ => {
            return Err(Error::processing(format!(
                "{} {} in {}: spec must be a mapping",
                kind, name, origin
            )));
        }
    };
    spec.insert(Value::from("name"), Value::from(name.as_str()));
    let spec = Value::Mapping(spec);

    let entity = match kind.as_str() {
        "Region" | "Site" => DesignEntity::Site(from_spec::<Site>(spec, &kind, &name, origin)?),
        "Network" => DesignEntity::Network(from_spec::<Network>(spec, &kind, &name, origin)?),
        "NetworkLink" => DesignEntity::NetworkLink(from_spec::<NetworkLink>(spec, &kind, &name, origin)?),
        "HostProfile" => DesignEntity::HostProfile(from_spec::<HostProfile>(spec, &kind, &name, origin)?),
        "HardwareProfile" => {
            DesignEntity::HardwareProfile(from_spec::<HardwareProfile>(spec, &kind, &name, origin)?)
        }
        "BaremetalNode" => DesignEntity::BaremetalNode(from_spec::<BaremetalNode>(spec, &kind, &name, origin)?),
        _ => DesignEntity::Unrecognized { kind, name },
    };

    Ok(entity)
}

fn from_spec<T: DeserializeOwned>(spec: Value, kind: &str, name: &str, origin: &str) -> Result<T> {
    serde_yaml::from_value(spec)
        .map_err(|e| Error::processing(format!("Invalid {} {} in {}: {}", kind, name, origin, e)))
}

#[async_trait::async_trait]
impl IngesterPlugin for YamlIngester {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn ingest(&self, params: &IngestParams) -> Result<Vec<DesignEntity>> {
        if let Some(content) = &params.content {
            let origin = params.design_ref.as_deref().unwrap_or("inline content");
            return self.parse(content, origin);
        }

        if params.filenames.is_empty() {
            return Err(Error::invalid_argument(
                "yaml plugin needs document content or at least one filename",
            ));
        }

        let mut entities = Vec::new();
        for path in &params.filenames {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::processing(format!("Failed to read {}: {}", path.display(), e))
            })?;
            entities.extend(self.parse(&text, &path.display().to_string())?);
        }
        Ok(entities)
    }
}

/// Factory for the YAML ingestion plugin
pub struct YamlPluginFactory;

impl IngesterPluginFactory for YamlPluginFactory {
    fn create(&self) -> Result<Box<dyn IngesterPlugin>> {
        Ok(Box::new(YamlIngester::new()))
    }

    fn describe(&self) -> &str {
        "drydock_ingester_yaml::YamlPluginFactory"
    }
}

/// Enable the YAML plugin on an ingester
pub fn register(ingester: &Ingester) -> Result<Vec<String>> {
    let factory: Box<dyn IngesterPluginFactory> = Box::new(YamlPluginFactory);
    ingester.enable_plugins(vec![factory])
}
