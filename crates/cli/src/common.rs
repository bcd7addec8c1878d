//! Input discovery and settings shared by the subcommands.

use clap::{Args, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use unreal_apigen_common::{GenerationMode, GenerationPassMemo, GeneratorConfig};
use unreal_apigen_core::{generate, GenerationOutput, OpenApiDocument};
use walkdir::WalkDir;

const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Output flavour selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ModeArg {
    /// Engine subsystems for the platform's own services
    ObjectModel,
    /// Client subsystems for user microservices
    ServiceClient,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ObjectModel => Self::ObjectModel,
            ModeArg::ServiceClient => Self::ServiceClient,
        }
    }
}

/// Documents and settings of one generation run.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(
        value_name = "INPUTS",
        required = true,
        help = "OpenAPI documents or directories containing them"
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Generator configuration (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Memo of a previous generation pass")]
    pub memo: Option<PathBuf>,

    #[arg(long, value_enum, help = "Override the configured generation mode")]
    pub mode: Option<ModeArg>,

    #[arg(long = "export-macro", value_name = "MACRO", help = "Override the configured export macro")]
    pub export_macro: Option<String>,
}

impl SourceArgs {
    /// Configuration file with command line overrides applied.
    pub fn load_config(&self) -> Result<GeneratorConfig, String> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(export_macro) = &self.export_macro {
            config.export_macro.clone_from(export_macro);
        }
        Ok(config)
    }

    /// The previous pass named by `--memo`, or an empty memo.
    pub fn load_memo(&self) -> Result<GenerationPassMemo, String> {
        match &self.memo {
            Some(path) => GenerationPassMemo::load(path),
            None => Ok(GenerationPassMemo::new()),
        }
    }

    /// Parse every input document and run the generator.
    pub fn run_generator(&self, config: &GeneratorConfig) -> Result<GenerationOutput, String> {
        let files = discover_inputs(&self.inputs)?;
        if files.is_empty() {
            return Err("No OpenAPI documents found in the given inputs".to_string());
        }
        let documents = files
            .iter()
            .map(|path| load_document(path))
            .collect::<Result<Vec<_>, _>>()?;
        let memo = self.load_memo()?;

        tracing::info!(documents = documents.len(), mode = ?config.mode, "Generating bindings.");
        generate(&documents, config, &memo).map_err(|e| format!("Generation failed: {e}"))
    }
}

/// Expand files and directories into a sorted, deduplicated list of documents.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(format!("Input not found: {}", input.display()));
        }
        for entry in WalkDir::new(input) {
            let entry = entry.map_err(|err| format!("Failed to read input directory: {err}"))?;
            if entry.file_type().is_file() && is_document(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Read one document; `.json` files are parsed as JSON, anything else as YAML.
pub fn load_document(path: &Path) -> Result<OpenApiDocument, String> {
    let content = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    let label = path.display().to_string();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document = if is_json {
        OpenApiDocument::from_json(&label, &content)
    } else {
        OpenApiDocument::from_yaml(&label, &content)
    };
    document.map_err(|err| err.to_string())
}

/// Run a fallible command body and turn its outcome into an exit code.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_inputs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("services");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("mail.yaml"), "").unwrap();
        fs::write(dir.path().join("b.json"), "").unwrap();
        fs::write(dir.path().join("a.YML"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = discover_inputs(&[dir.path().to_path_buf(), dir.path().join("b.json")]).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.YML", "b.json", "services/mail.yaml"]);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_inputs(&[dir.path().join("absent")]).unwrap_err();
        assert!(err.starts_with("Input not found"));
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("apigen.toml");
        fs::write(&config_path, "export-macro = \"GAME_API\"\nheader-path = \"Game/Public/\"\n").unwrap();

        let args = SourceArgs {
            inputs: vec![],
            config: Some(config_path),
            memo: None,
            mode: Some(ModeArg::ServiceClient),
            export_macro: Some("MS_API".into()),
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.export_macro, "MS_API");
        assert_eq!(config.header_path, "Game/Public/");
        assert_eq!(config.mode, GenerationMode::ServiceClient);
        assert!(args.load_memo().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_document_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail.yml");
        fs::write(&path, "info:\n  title: mail basic\npaths: {}\n").unwrap();
        let document = load_document(&path).unwrap();
        assert_eq!(document.info.title, "mail basic");
    }
}
