//! Running the external tools sluice drives: the style preprocessor and
//! `curl` for remote transfers.
//!
//! ```ignore
//! let css = Cmd::from_slice(&["sass", "main.scss"]).filter(&STYLE_FILTER).run()?;
//!
//! // exit code inspected by the caller, login fed through stdin
//! let head = Cmd::new("curl").args(["--config", "-", "--head", url]).stdin(login).output()?;
//! ```

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::log;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot {action} `{program}`: {source}")]
    Io {
        program: String,
        action: &'static str,
        #[source]
        source: io::Error,
    },

    /// Non-zero exit; `detail` is the cleaned stderr, prefixed by a newline.
    #[error("`{program}` failed with {status}{detail}")]
    Failed {
        program: String,
        status: ExitStatus,
        detail: String,
    },
}

/// One external process invocation.
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    input: Option<Vec<u8>>,
    filter: &'static FilterRule,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            input: None,
            filter: &EMPTY_FILTER,
        }
    }

    /// Program plus arguments, as written in configuration.
    pub fn from_slice<S: AsRef<OsStr>>(argv: &[S]) -> Self {
        match argv.split_first() {
            Some((program, rest)) => Self::new(program).args(rest),
            None => Self::new(""),
        }
    }

    /// Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        if !arg.as_ref().is_empty() {
            self.args.push(arg.as_ref().to_owned());
        }
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.envs.extend(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned())),
        );
        self
    }

    /// Bytes written to the child's stdin, which is closed afterwards.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.input = Some(data.as_ref().to_vec());
        self
    }

    /// Stderr lines to keep out of the log of a successful run.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = filter;
        self
    }

    /// Run to completion; a non-zero exit is an error carrying the whole
    /// stderr. Stderr of a successful run is logged through the filter.
    pub fn run(self) -> Result<Output, ExecError> {
        let filter = self.filter;
        let program = self.program_name();
        let output = self.output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let cleaned = strip_ansi(stderr.trim());
            return Err(ExecError::Failed {
                program,
                status: output.status,
                detail: if cleaned.is_empty() {
                    String::new()
                } else {
                    format!("\n{cleaned}")
                },
            });
        }

        filter.log(&program, &stderr);
        Ok(output)
    }

    /// Run to completion and return the output whatever the exit status.
    pub fn output(self) -> Result<Output, ExecError> {
        let program = self.program_name();
        let io_err = |action| {
            let program = program.clone();
            move |source| ExecError::Io {
                program,
                action,
                source,
            }
        };

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(if self.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(io_err("start"))?;
        if let Some(data) = &self.input
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(data).map_err(io_err("write to"))?;
        }
        child.wait_with_output().map_err(io_err("wait for"))
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Known noise in a tool's stderr, matched by line prefix.
pub struct FilterRule {
    skip: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip: &'static [&'static str]) -> Self {
        Self { skip }
    }

    fn is_noise(&self, line: &str) -> bool {
        line.is_empty() || self.skip.iter().any(|prefix| line.starts_with(prefix))
    }

    /// Lines worth showing, colors removed.
    fn strip(&self, output: &str) -> String {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.is_noise(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn log(&self, name: &str, output: &str) {
        let kept = self.strip(output);
        if !kept.is_empty() {
            log!(name; "{kept}");
        }
    }
}

static EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Drops every line.
pub static SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

static ANSI_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").ok());

pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    match ANSI_RE.as_ref() {
        Some(re) => re.replace_all(s, ""),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31merror\x1b[0m: bad"), "error: bad");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_filter_drops_noise() {
        static FILTER: FilterRule = FilterRule::new(&["DEPRECATION WARNING"]);
        assert!(FILTER.is_noise("DEPRECATION WARNING: slash-div"));
        assert!(FILTER.is_noise(""));
        assert_eq!(
            FILTER.strip("DEPRECATION WARNING: x\n\n  Error: expected \";\"  \n"),
            "Error: expected \";\""
        );
        assert_eq!(SILENT_FILTER.strip("anything\nat all"), "");
    }

    #[test]
    fn test_from_slice_splits_program() {
        let cmd = Cmd::from_slice(&["npx", "sass", "--version"]);
        assert_eq!(cmd.program_name(), "npx");
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_empty_args_are_dropped() {
        let cmd = Cmd::new("sass").arg("").args(["", "--quiet"]);
        assert_eq!(cmd.args, vec![OsString::from("--quiet")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_stdin() {
        let output = Cmd::new("cat").stdin("a { color: red }").run().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "a { color: red }");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_keeps_exit_code() {
        let output = Cmd::new("sh").args(["-c", "exit 78"]).output().unwrap();
        assert_eq!(output.status.code(), Some(78));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failure_is_error() {
        let err = Cmd::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .run()
            .unwrap_err();
        assert!(matches!(err, ExecError::Failed { .. }));
        let message = err.to_string();
        assert!(message.contains("`sh` failed"));
        assert!(message.contains("broken"));
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("sluice-no-such-program").output().unwrap_err();
        assert!(matches!(err, ExecError::Io { action: "start", .. }));
    }
}
