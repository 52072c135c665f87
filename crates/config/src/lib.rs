// PinLab - GPIO Pin-State Matrix
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use pinlab_core::{PinFunction, PinState, Port};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default schema version for YAML manifests
fn default_schema_version() -> String {
    "1.0".to_string()
}

/// One cell a board asserts at startup.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PinBinding {
    pub id: String,
    pub port: Port,
    pub pin: usize,
    pub function: PinFunction,
    #[serde(default)]
    pub state: PinState,
}

/// Declarative board description: matrix size plus the bindings applied to
/// a freshly created matrix.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BoardManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    pub pin_count: usize,
    #[serde(default)]
    pub bindings: Vec<PinBinding>,
}

impl BoardManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read board manifest at {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid board manifest at {:?}", path.as_ref()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self =
            serde_yaml::from_str(yaml).context("Failed to parse Board Manifest YAML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.name.trim().is_empty() {
            anyhow::bail!("Board 'name' cannot be empty");
        }

        if self.pin_count == 0 {
            anyhow::bail!("'pin_count' must be greater than zero");
        }

        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if binding.id.trim().is_empty() {
                anyhow::bail!("Binding ids cannot be empty");
            }
            if !seen.insert(binding.id.as_str()) {
                anyhow::bail!("Duplicate binding id '{}'", binding.id);
            }
            if binding.pin >= self.pin_count {
                anyhow::bail!(
                    "Binding '{}' addresses pin {} but the board has {} pins per port",
                    binding.id,
                    binding.pin,
                    self.pin_count
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BoardManifest;
    use pinlab_core::{PinFunction, PinState, Port};

    #[test]
    fn test_valid_manifest() {
        let yaml = r#"
schema_version: "1.0"
name: discovery-demo
pin_count: 6
bindings:
  - id: status-led
    port: a
    pin: 0
    function: output
    state: on
  - id: aux-mux
    port: b
    pin: 2
    function: alternate
    state: on
"#;
        let manifest = BoardManifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.name, "discovery-demo");
        assert_eq!(manifest.pin_count, 6);
        assert_eq!(manifest.bindings.len(), 2);
        assert_eq!(manifest.bindings[0].port, Port::A);
        assert_eq!(manifest.bindings[0].function, PinFunction::Output);
        assert_eq!(manifest.bindings[0].state, PinState::On);
    }

    #[test]
    fn test_state_defaults_to_off() {
        let yaml = r#"
name: bare-board
pin_count: 2
bindings:
  - id: sense
    port: c
    pin: 1
    function: input
"#;
        let manifest = BoardManifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.schema_version, "1.0");
        assert_eq!(manifest.bindings[0].state, PinState::Off);
    }

    #[test]
    fn test_port_and_function_aliases_parse() {
        let yaml = r#"
name: alias-board
pin_count: 4
bindings:
  - id: led
    port: gpiob
    pin: 3
    function: out
"#;
        let manifest = BoardManifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.bindings[0].port, Port::B);
        assert_eq!(manifest.bindings[0].function, PinFunction::Output);
    }

    #[test]
    fn test_zero_pin_count_rejected() {
        let yaml = r#"
name: empty-board
pin_count: 0
"#;
        let err = BoardManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("pin_count"));
    }

    #[test]
    fn test_out_of_range_pin_rejected() {
        let yaml = r#"
name: short-board
pin_count: 2
bindings:
  - id: led
    port: a
    pin: 5
    function: output
"#;
        let err = BoardManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("pin 5"));
    }

    #[test]
    fn test_duplicate_binding_id_rejected() {
        let yaml = r#"
name: twin-board
pin_count: 4
bindings:
  - id: led
    port: a
    pin: 0
    function: output
  - id: led
    port: b
    pin: 1
    function: output
"#;
        let err = BoardManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate binding id"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
name: odd-board
pin_count: 2
voltage: 3.3
"#;
        assert!(BoardManifest::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_unsupported_schema_version_rejected() {
        let yaml = r#"
schema_version: "2.0"
name: future-board
pin_count: 2
"#;
        let err = BoardManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Unsupported schema_version"));
    }
}
