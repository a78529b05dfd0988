//! Single-file JSON provider (Format C).
//!
//! Ingests a pre-merged design document: components with embedded pin
//! connectivity, plus a bare list of net names used only to cross-check
//! the derived nets, never as the source of truth.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::model::{Component, Net, Pin, NC_NET};
use crate::netlist::NetlistBuilder;
use crate::provider::{DesignProvider, Fetched, ProviderError};

#[derive(Debug, Deserialize)]
struct JsonDesign {
    #[serde(default)]
    components: Vec<JsonComponent>,
    #[serde(default)]
    nets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JsonComponent {
    #[serde(default)]
    designator: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    footprint: String,
    /// Source sheet path; only the file name becomes the page identifier.
    #[serde(default)]
    sheet: String,
    #[serde(default)]
    schematic_x: f64,
    #[serde(default)]
    schematic_y: f64,
    #[serde(default)]
    parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pins: Vec<JsonPin>,
}

#[derive(Debug, Deserialize)]
struct JsonPin {
    #[serde(default)]
    name: String,
    #[serde(default)]
    net: String,
}

enum JsonSource {
    File(PathBuf),
    Memory(String),
}

/// Format C provider over one pre-merged JSON document.
pub struct JsonDesignProvider {
    source: JsonSource,
    state: Option<Fetched>,
}

impl JsonDesignProvider {
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            source: JsonSource::File(path),
            state: None,
        }
    }

    pub fn from_source(content: String) -> Self {
        Self {
            source: JsonSource::Memory(content),
            state: None,
        }
    }
}

impl DesignProvider for JsonDesignProvider {
    fn fetch(&mut self) -> Result<(), ProviderError> {
        if self.state.is_some() {
            return Ok(());
        }

        let content = match &self.source {
            JsonSource::File(path) => std::fs::read_to_string(path)?,
            JsonSource::Memory(content) => content.clone(),
        };
        let design: JsonDesign = serde_json::from_str(&content)
            .map_err(|err| ProviderError::Ingestion(format!("invalid JSON design: {err}")))?;

        let mut components = Vec::new();
        for raw in design.components {
            if raw.designator.is_empty() {
                tracing::warn!("component without a designator, skipping");
                continue;
            }
            components.push(project_component(raw));
        }

        let nets = NetlistBuilder::build(&components);
        validate_declared_nets(&design.nets, &nets);

        tracing::info!(
            components = components.len(),
            nets = nets.len(),
            "JSON design ingested"
        );
        self.state = Some(Fetched { components, nets });
        Ok(())
    }

    fn get_components(&self) -> Result<&[Component], ProviderError> {
        self.state
            .as_ref()
            .map(|s| s.components.as_slice())
            .ok_or(ProviderError::NotReady)
    }

    fn get_nets(&self) -> Result<&[Net], ProviderError> {
        self.state
            .as_ref()
            .map(|s| s.nets.as_slice())
            .ok_or(ProviderError::NotReady)
    }
}

fn project_component(raw: JsonComponent) -> Component {
    let parameter = |key: &str| {
        raw.parameters
            .get(key)
            .map(value_to_string)
            .unwrap_or_default()
    };

    // Value prefers the Comment parameter, falling back to the part number.
    let mut value = parameter("Comment");
    if value.is_empty() {
        value = parameter("PN");
    }

    let mut component = Component::new(&raw.designator)
        .with_value(value)
        .with_mpn(parameter("PN"))
        .with_footprint(&raw.footprint)
        .with_description(&raw.description)
        .with_page(file_name(&raw.sheet))
        .with_location(raw.schematic_x, raw.schematic_y);

    for (key, val) in &raw.parameters {
        if key != "PN" && key != "Comment" {
            component
                .properties
                .insert(key.clone(), value_to_string(val));
        }
    }

    for pin in raw.pins {
        let net = if pin.net.is_empty() {
            NC_NET.to_string()
        } else {
            pin.net
        };
        let name = if semantic_source_name(&pin.name) {
            pin.name.clone()
        } else {
            String::new()
        };
        component.add_pin(Pin::new(pin.name, name, net));
    }

    component
}

/// Raw pin names that are pure numerals or the standard anode/cathode
/// letters carry no meaning; everything else is kept as the semantic name.
fn semantic_source_name(raw: &str) -> bool {
    !raw.is_empty()
        && !raw.chars().all(|c| c.is_ascii_digit())
        && raw != "A"
        && raw != "K"
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strip directory components from either path flavor.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The declared net list is validation-only: derived connectivity is never
/// altered to match it.
fn validate_declared_nets(declared: &[String], derived: &[Net]) {
    for name in declared {
        if !derived.iter().any(|net| &net.name == name) {
            tracing::warn!(net = %name, "declared net has no members in the design");
        }
    }
}
