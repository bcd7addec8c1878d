use clap::Args;
use dialoguer::Confirm;
use similar::TextDiff;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use unreal_apigen_core::GeneratedFile;

use crate::common::{run_command, SourceArgs};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_name = "DIR", help = "Directory generated paths are relative to")]
    pub out: PathBuf,

    #[arg(long = "dry-run", help = "Report planned changes without writing anything")]
    pub dry_run: bool,

    #[arg(long, help = "Print a unified diff for every modified file")]
    pub diff: bool,

    #[arg(
        long = "yes",
        short = 'y',
        help = "Skip confirmation prompt and write changes automatically"
    )]
    pub yes: bool,
}

pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| run_inner(&args))
}

/// A generated file compared against what is on disk.
#[derive(Debug)]
struct FileChange {
    /// Path relative to the output directory
    rel_path: String,
    new_content: String,
    /// None if the file doesn't exist yet
    existing_content: Option<String>,
}

impl FileChange {
    fn is_new(&self) -> bool {
        self.existing_content.is_none()
    }

    fn is_modified(&self) -> bool {
        match &self.existing_content {
            Some(existing) => existing != &self.new_content,
            None => false,
        }
    }

    /// Unified diff with hunk headers against the current content, colored
    /// for terminals. `None` when the file does not exist or is unchanged.
    fn generate_diff(&self) -> Option<String> {
        let existing = self
            .existing_content
            .as_deref()
            .filter(|existing| *existing != self.new_content)?;

        let unified = TextDiff::from_lines(existing, self.new_content.as_str())
            .unified_diff()
            .context_radius(3)
            .header(
                &format!("{} (current)", self.rel_path),
                &format!("{} (generated)", self.rel_path),
            )
            .to_string();

        Some(unified.lines().map(colorize_diff_line).collect::<Vec<_>>().join("\n"))
    }
}

fn colorize_diff_line(line: &str) -> String {
    let color = if line.starts_with("---") || line.starts_with("+++") {
        "\x1b[1m"
    } else if line.starts_with("@@") {
        "\x1b[36m"
    } else if line.starts_with('-') {
        "\x1b[31m"
    } else if line.starts_with('+') {
        "\x1b[32m"
    } else {
        return line.to_string();
    };
    format!("{color}{line}\x1b[0m")
}

fn run_inner(args: &GenerateArgs) -> Result<(), String> {
    let config = args.source.load_config()?;
    let output = args.source.run_generator(&config)?;
    let changes = plan_changes(&args.out, output.files)?;

    let new_count = changes.iter().filter(|c| c.is_new()).count();
    let modified: Vec<&FileChange> = changes.iter().filter(|c| c.is_modified()).collect();
    let unchanged_count = changes.len() - new_count - modified.len();

    for change in changes.iter().filter(|c| c.is_new()) {
        tracing::debug!(path = %change.rel_path, "New file.");
    }
    if !modified.is_empty() {
        println!("\x1b[33mFiles to be modified:\x1b[0m");
        for file in &modified {
            println!("  \x1b[33m~\x1b[0m {}", file.rel_path);
        }
        println!();

        if args.diff {
            println!("\x1b[1m--- Diffs ---\x1b[0m\n");
            for file in &modified {
                if let Some(diff) = file.generate_diff() {
                    println!("{diff}");
                }
            }
        }
    }

    println!(
        "Summary: {new_count} new, {} modified, {unchanged_count} unchanged",
        modified.len()
    );

    if args.dry_run {
        return Ok(());
    }
    if new_count + modified.len() == 0 {
        println!("All files are up to date.");
        return Ok(());
    }

    if !args.yes && std::io::stdin().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Write changes to {}?", args.out.display()))
            .default(true)
            .interact()
            .map_err(|err| format!("Failed to read confirmation: {err}"))?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let (created, updated) = apply_changes(&args.out, &changes)?;
    println!("\n\x1b[32m✓\x1b[0m Generated bindings: {created} file(s) created, {updated} file(s) modified");
    Ok(())
}

/// Pair every generated file with its current content under `out_dir`.
fn plan_changes(out_dir: &Path, files: Vec<GeneratedFile>) -> Result<Vec<FileChange>, String> {
    files
        .into_iter()
        .map(|file| {
            let target = out_dir.join(&file.path);
            let existing_content = if target.exists() {
                Some(
                    fs::read_to_string(&target)
                        .map_err(|err| format!("Failed to read existing file {}: {err}", file.path))?,
                )
            } else {
                None
            };
            Ok(FileChange {
                rel_path: file.path,
                new_content: file.contents,
                existing_content,
            })
        })
        .collect()
}

/// Write new and modified files, creating parent directories.
fn apply_changes(out_dir: &Path, changes: &[FileChange]) -> Result<(usize, usize), String> {
    let mut created = 0;
    let mut modified = 0;

    for change in changes {
        if !(change.is_new() || change.is_modified()) {
            continue;
        }
        let target_path = out_dir.join(&change.rel_path);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|err| format!("Failed to create directory: {err}"))?;
        }
        fs::write(&target_path, &change.new_content)
            .map_err(|err| format!("Failed to write {}: {err}", change.rel_path))?;

        if change.is_new() {
            created += 1;
        } else {
            modified += 1;
        }
    }
    tracing::info!(created, modified, out = %out_dir.display(), "Wrote generated files.");

    Ok((created, modified))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const INVENTORY: &str = r##"{
  "info": { "title": "inventory basic" },
  "paths": {
    "/basic/inventory/items": {
      "get": {
        "parameters": [ { "name": "scope", "in": "query", "schema": { "type": "string" } } ],
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Item" } } }
          }
        }
      }
    }
  },
  "components": {
    "schemas": {
      "Item": { "type": "object", "required": ["id"], "properties": { "id": { "type": "string" } } }
    }
  }
}"##;

    fn args(input: &Path, out: &Path) -> GenerateArgs {
        GenerateArgs {
            source: SourceArgs {
                inputs: vec![input.to_path_buf()],
                config: None,
                memo: None,
                mode: None,
                export_macro: None,
            },
            out: out.to_path_buf(),
            dry_run: false,
            diff: false,
            yes: true,
        }
    }

    fn change(existing: Option<&str>, new: &str) -> FileChange {
        FileChange {
            rel_path: "AutoGen/Item.h".into(),
            new_content: new.into(),
            existing_content: existing.map(str::to_string),
        }
    }

    #[test]
    fn test_change_classification() {
        assert!(change(None, "a").is_new());
        assert!(!change(Some("a"), "a").is_modified());
        assert!(change(Some("a"), "b").is_modified());
        assert!(change(Some("a"), "a").generate_diff().is_none());

        let diff = change(Some("one\ntwo\n"), "one\nthree\n").generate_diff().unwrap();
        assert!(diff.contains("\x1b[1m--- AutoGen/Item.h (current)\x1b[0m"));
        assert!(diff.contains("\x1b[36m@@ -1,2 +1,2 @@\x1b[0m"));
        assert!(diff.contains("\x1b[31m-two\x1b[0m"));
        assert!(diff.contains("\x1b[32m+three\x1b[0m"));
        assert!(diff.contains("\n one\n"));
    }

    #[test]
    fn test_generate_writes_files_and_memo() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("inventory.json");
        fs::write(&input, INVENTORY).unwrap();
        let out = dir.path().join("Source");

        run_inner(&args(&input, &out)).unwrap();

        let header = out.join("BeamableCore/Public/AutoGen/Item.h");
        assert!(header.is_file());
        assert!(out.join("BeamableCore/Public/AutoGen/SubSystems/BeamInventoryApi.h").is_file());
        let memo = fs::read_to_string(out.join("BeamableCore_GenerationPass.json")).unwrap();
        assert!(memo.contains("\"Item\": \"BeamableCore/Public/AutoGen/Item.h\""));

        let config = args(&input, &out).source.load_config().unwrap();
        let output = args(&input, &out).source.run_generator(&config).unwrap();
        let planned = plan_changes(&out, output.files).unwrap();
        assert!(planned.iter().all(|c| !c.is_new() && !c.is_modified()));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("inventory.json");
        fs::write(&input, INVENTORY).unwrap();
        let out = dir.path().join("Source");

        let mut dry = args(&input, &out);
        dry.dry_run = true;
        run_inner(&dry).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_generation_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, "{ not json").unwrap();
        let err = run_inner(&args(&input, &dir.path().join("Source"))).unwrap_err();
        assert!(err.contains("broken.json"));
        assert_eq!(run(args(&input, &dir.path().join("Source"))), 1);
    }
}
