use clap::Args;

use crate::common::{run_command, SourceArgs};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run(args: CheckArgs) -> i32 {
    run_command(|| run_inner(&args).map(|count| println!("Check passed: {count} file(s) would be generated")))
}

/// Number of files a generation run would produce, memo file included.
fn run_inner(args: &CheckArgs) -> Result<usize, String> {
    let config = args.source.load_config()?;
    let output = args.source.run_generator(&config)?;
    Ok(output.files.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    const SHAPES: &str = r#"
info:
  title: shapes basic
components:
  schemas:
    Drawing:
      type: object
      required: [shape]
      properties:
        shape:
          oneOf:
            - $ref: '#/components/schemas/Circle'
            - $ref: '#/components/schemas/Square'
    Circle:
      type: object
      properties:
        radius: { type: number }
    Square:
      type: object
      properties:
        side: { type: number }
"#;

    fn args(dir: &std::path::Path) -> CheckArgs {
        CheckArgs {
            source: SourceArgs {
                inputs: vec![dir.to_path_buf()],
                config: None,
                memo: None,
                mode: None,
                export_macro: None,
            },
        }
    }

    #[test]
    fn test_check_reports_fatal_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shapes.yaml"), SHAPES).unwrap();
        let err = run_inner(&args(dir.path())).unwrap_err();
        assert!(err.contains("Drawing.shape"), "{err}");
    }

    #[test]
    fn test_check_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shapes.yaml"), SHAPES).unwrap();
        let config = dir.path().join("apigen.toml");
        fs::write(&config, "[union-overrides]\n\"UOneOf_UCircle_USquare*\" = \"UBeamShape*\"\n").unwrap();

        let mut check = args(dir.path());
        check.source.inputs = vec![dir.path().join("shapes.yaml")];
        check.source.config = Some(config);
        // Drawing, Circle, Square and BeamShape (4 files each), OptionalDouble (4), memo.
        assert_eq!(run_inner(&check).unwrap(), 21);
        assert_eq!(run(check), 0);
    }

    #[test]
    fn test_empty_input_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(args(dir.path())), 1);
    }
}
