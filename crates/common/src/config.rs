//! Generator configuration.
//!
//! The configuration is an immutable value built once by the CLI and passed by
//! reference into every generation step. It is read from a TOML file with
//! kebab-case keys; every key is optional and falls back to the values used by
//! the Beamable Unreal SDK. A table given in the file replaces the matching
//! default table as a whole.
//!
//! ```toml
//! export-macro = "MYGAME_API"
//! mode = "service-client"
//!
//! [type-overrides]
//! Player = "PlayerId"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Selects which flavour of bindings is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// Beamable backend services grouped into engine subsystems.
    #[default]
    ObjectModel,
    /// Client bindings for a single microservice. Endpoint name collisions are fatal here.
    ServiceClient,
}

impl GenerationMode {
    /// Kebab-case name, as accepted on the command line and in the config file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObjectModel => "object-model",
            Self::ServiceClient => "service-client",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object-model" | "object" => Ok(Self::ObjectModel),
            "service-client" | "microservice" => Ok(Self::ServiceClient),
            other => Err(format!(
                "Unknown generation mode '{other}' (expected 'object-model' or 'service-client')"
            )),
        }
    }
}

/// Settings consumed by the generator core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Export macro placed on every runtime module type.
    pub export_macro: String,
    /// Export macro placed on the Blueprint node types.
    pub blueprint_export_macro: String,
    /// Prefix of every generated header path; also the prefix of include statements.
    pub header_path: String,
    /// Prefix of every generated implementation file path.
    pub cpp_path: String,
    /// Prefix of the Blueprint node headers.
    pub blueprint_header_path: String,
    /// Prefix of the Blueprint node implementation files.
    pub blueprint_cpp_path: String,
    /// Generation mode.
    pub mode: GenerationMode,
    /// File name of the memo written at the end of a run.
    pub memo_file_name: String,
    /// Schema renames applied after collision resolution (`Player` to `PlayerId`).
    pub type_overrides: BTreeMap<String, String>,
    /// Endpoint renames applied after collision resolution (`PostToken` to `Authenticate`).
    pub endpoint_overrides: BTreeMap<String, String>,
    /// Designed wrapper types for polymorphic unions, keyed by the union's structural spelling.
    pub union_overrides: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let type_overrides = [("Player", "PlayerId"), ("DeleteRole", "DeleteRoleRequestBody")];
        let endpoint_overrides = [("PostToken", "Authenticate")];
        let union_overrides = [
            (
                "UOneOf_UContentReference_UTextReference_UBinaryReference*",
                "UBaseContentReference*",
            ),
            ("UOneOf_UCronTrigger_UExactTrigger*", "UBeamJobTrigger*"),
            (
                "UOneOf_UHttpCall_UPublishMessage_UServiceCall*",
                "UBeamJobType*",
            ),
        ];

        Self {
            export_macro: "BEAMABLECORE_API".to_string(),
            blueprint_export_macro: "BEAMABLECOREBLUEPRINTNODES_API".to_string(),
            header_path: "BeamableCore/Public/".to_string(),
            cpp_path: "BeamableCore/Private/".to_string(),
            blueprint_header_path: "BeamableCoreBlueprintNodes/Public/BeamFlow/ApiRequest/"
                .to_string(),
            blueprint_cpp_path: "BeamableCoreBlueprintNodes/Private/BeamFlow/ApiRequest/"
                .to_string(),
            mode: GenerationMode::default(),
            memo_file_name: "BeamableCore_GenerationPass.json".to_string(),
            type_overrides: to_map(&type_overrides),
            endpoint_overrides: to_map(&endpoint_overrides),
            union_overrides: to_map(&union_overrides),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse generator config: {e}"))
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), mode = %config.mode, "Loaded generator config.");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sdk_layout() {
        let config = GeneratorConfig::default();
        assert_eq!(config.export_macro, "BEAMABLECORE_API");
        assert_eq!(config.header_path, "BeamableCore/Public/");
        assert_eq!(config.mode, GenerationMode::ObjectModel);
        assert_eq!(
            config.endpoint_overrides.get("PostToken").map(String::as_str),
            Some("Authenticate")
        );
        assert_eq!(config.union_overrides.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
export-macro = "MYGAME_API"
mode = "service-client"
"#,
        )
        .unwrap();

        assert_eq!(config.export_macro, "MYGAME_API");
        assert_eq!(config.mode, GenerationMode::ServiceClient);
        assert_eq!(config.cpp_path, "BeamableCore/Private/");
        assert_eq!(
            config.type_overrides.get("Player").map(String::as_str),
            Some("PlayerId")
        );
    }

    #[test]
    fn test_override_table_replaces_default_table() {
        let config = GeneratorConfig::from_toml_str(
            r#"
[type-overrides]
Item = "InventoryItem"
"#,
        )
        .unwrap();

        assert_eq!(config.type_overrides.len(), 1);
        assert_eq!(
            config.type_overrides.get("Item").map(String::as_str),
            Some("InventoryItem")
        );
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = GeneratorConfig::from_toml_str("mode = \"sideways\"").unwrap_err();
        assert!(err.contains("Failed to parse generator config"), "{err}");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(
            "service-client".parse::<GenerationMode>().unwrap(),
            GenerationMode::ServiceClient
        );
        assert_eq!(
            "Object-Model".parse::<GenerationMode>().unwrap(),
            GenerationMode::ObjectModel
        );
        assert!("other".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apigen.toml");
        fs::write(&path, "header-path = \"Game/Public/\"\n").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.header_path, "Game/Public/");
        assert!(GeneratorConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
