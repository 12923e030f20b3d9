//! External style preprocessor.
//!
//! Runs the configured command once per input file and takes its stdout as
//! the compiled CSS. The command template may use these variables:
//!
//! | Variable            | Value                                  |
//! |---------------------|----------------------------------------|
//! | `$SLUICE_INPUT`     | absolute path of the input file        |
//! | `$SLUICE_SOURCE_DIR`| directory containing the input file    |
//! | `$SLUICE_ROOT`      | project root                           |
//! | `$SLUICE_ENV`       | `development`, `staging`, `production` |
//!
//! The same variables are exported to the child process environment.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use super::{Transform, TransformError};
use crate::asset::AssetFile;
use crate::core::Environment;
use crate::utils::exec::{Cmd, FilterRule};

/// Preprocessor chatter that is not worth a log line.
static STYLE_FILTER: FilterRule = FilterRule::new(&["DEPRECATION WARNING", "More info"]);

/// `  src/styles/a.scss 12:3  root stylesheet`
static LINE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[ \t]([0-9]+):[0-9]+[ \t]+root stylesheet").ok());

/// Invocation-wide template variables.
#[derive(Debug, Clone)]
pub struct CommandVars {
    pub root: PathBuf,
    pub environment: Environment,
}

impl CommandVars {
    /// Variables for one input file.
    fn for_file(&self, file: &AssetFile) -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert(
            "SLUICE_INPUT".into(),
            file.source.display().to_string(),
        );
        vars.insert(
            "SLUICE_SOURCE_DIR".into(),
            file.source_dir().display().to_string(),
        );
        vars.insert("SLUICE_ROOT".into(), self.root.display().to_string());
        vars.insert("SLUICE_ENV".into(), self.environment.name().into());
        vars
    }
}

/// Replace `$SLUICE_*` variables in command arguments.
///
/// Longer names are substituted first so `$SLUICE_ROOT` never clobbers a
/// longer variable sharing its prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

    args.iter()
        .map(|arg| {
            keys.iter().fold(arg.clone(), |acc, key| {
                acc.replace(&format!("${key}"), &vars[*key])
            })
        })
        .collect()
}

/// Compile a stylesheet with an external command.
pub struct CompileStyles {
    command: Vec<String>,
    vars: CommandVars,
}

impl CompileStyles {
    pub fn new(command: Vec<String>, vars: CommandVars) -> Self {
        Self { command, vars }
    }
}

impl Transform for CompileStyles {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn apply(&self, mut file: AssetFile) -> Result<AssetFile, TransformError> {
        let Some(program) = self.command.first() else {
            return Err(TransformError::new(self.name(), &file, "no command configured"));
        };
        if which::which(program).is_err() {
            return Err(TransformError::new(
                self.name(),
                &file,
                format!("`{program}` not found, install it or update styles.command"),
            ));
        }

        let vars = self.vars.for_file(&file);
        let resolved = resolve_args(&self.command, &vars);

        let output = Cmd::from_slice(&resolved)
            .cwd(&self.vars.root)
            .envs(&vars)
            .filter(&STYLE_FILTER)
            .run()
            .map_err(|e| {
                let message = e.to_string();
                TransformError::new(self.name(), &file, message.clone())
                    .with_line(error_line(&message))
            })?;

        let css = String::from_utf8(output.stdout).map_err(|_| {
            TransformError::new(self.name(), &file, "compiler output is not valid UTF-8")
        })?;
        file.set_text(css);
        Ok(file)
    }
}

/// Line number reported by the preprocessor, if any.
fn error_line(message: &str) -> Option<usize> {
    LINE_RE
        .as_ref()?
        .captures(message)
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert("SLUICE_ROOT".into(), "/site".into());
        vars.insert("SLUICE_INPUT".into(), "/site/src/styles/a.scss".into());
        vars.insert("SLUICE_SOURCE_DIR".into(), "/site/src/styles".into());
        vars
    }

    #[test]
    fn test_resolve_args() {
        let args = vec![
            "sass".to_string(),
            "--load-path=$SLUICE_SOURCE_DIR".to_string(),
            "$SLUICE_INPUT".to_string(),
        ];
        assert_eq!(
            resolve_args(&args, &vars()),
            vec!["sass", "--load-path=/site/src/styles", "/site/src/styles/a.scss"]
        );
    }

    #[test]
    fn test_unknown_variable_kept() {
        let args = vec!["$HOME/x".to_string()];
        assert_eq!(resolve_args(&args, &vars()), vec!["$HOME/x"]);
    }

    #[test]
    fn test_error_line() {
        let message = "Error: Undefined variable.\n  ╷\n3 │   color: $nope;\n  ╵\n  src/styles/a.scss 3:10  root stylesheet";
        assert_eq!(error_line(message), Some(3));
        assert_eq!(error_line("Error: something"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_with_cat() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("a.scss");
        std::fs::write(&source, ".a { color: red; }").unwrap();

        let transform = CompileStyles::new(
            vec!["cat".into(), "$SLUICE_INPUT".into()],
            CommandVars {
                root: dir.path().to_path_buf(),
                environment: Environment::Development,
            },
        );
        let file = AssetFile::new(
            PathBuf::from("a.scss"),
            Vec::new(),
            crate::asset::ContentType::Style,
            source,
        );
        let out = transform.apply(file).unwrap();
        assert_eq!(out.text().unwrap(), ".a { color: red; }");
    }

    #[test]
    fn test_missing_program() {
        let transform = CompileStyles::new(
            vec!["sluice-no-such-compiler".into()],
            CommandVars {
                root: PathBuf::from("."),
                environment: Environment::Development,
            },
        );
        let file = AssetFile::new(
            PathBuf::from("a.scss"),
            Vec::new(),
            crate::asset::ContentType::Style,
            PathBuf::from("a.scss"),
        );
        let err = transform.apply(file).unwrap_err();
        assert!(err.message.contains("not found"));
    }
}
