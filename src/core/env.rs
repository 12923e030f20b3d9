//! Build environment resolution.
//!
//! The environment is picked once per invocation from the boolean selector
//! flags and then passed by value into every stage run.
//!
//! Priority when several selectors are given: `production > staging > dev`.

use std::fmt;

use thiserror::Error;

/// Closed set of build environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Selector flags in priority order (first match wins).
    const PRIORITY: [(Self, &'static [&'static str]); 3] = [
        (Self::Production, &["production", "prod"]),
        (Self::Staging, &["staging", "stage"]),
        (Self::Development, &["dev", "development"]),
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Map a selector flag to its environment.
    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::PRIORITY
            .iter()
            .find(|(_, names)| names.contains(&flag))
            .map(|(env, _)| *env)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the invoked task needs an explicit environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Fall back to development silently.
    Optional,
    /// Fail when no selector is given.
    Required,
}

/// The environment of one invocation. Never mutated after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentContext {
    environment: Environment,
}

impl EnvironmentContext {
    pub const fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub const fn environment(&self) -> Environment {
        self.environment
    }

    pub const fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }
}

/// No environment selector given for a task that needs one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "no environment selected for `{task}`; pass one of --production, --staging or --dev"
)]
pub struct EnvironmentUndefined {
    pub task: String,
}

/// Resolve the environment from the set of selector flags.
///
/// Unrecognized flags are ignored. When several selectors are present the
/// highest-priority one wins and the rest are reported in verbose mode.
pub fn resolve<I, S>(
    flags: I,
    requirement: Requirement,
    task: &str,
) -> Result<EnvironmentContext, EnvironmentUndefined>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found: Vec<Environment> = flags
        .into_iter()
        .filter_map(|flag| Environment::from_flag(flag.as_ref()))
        .collect();
    found.sort_by_key(|env| std::cmp::Reverse(*env));
    found.dedup();

    match found.as_slice() {
        [] => match requirement {
            Requirement::Optional => Ok(EnvironmentContext::new(Environment::Development)),
            Requirement::Required => Err(EnvironmentUndefined {
                task: task.to_string(),
            }),
        },
        [winner, rest @ ..] => {
            if !rest.is_empty() {
                let ignored: Vec<_> = rest.iter().map(|e| e.name()).collect();
                crate::debug!("env"; "using {}, ignoring {}", winner, ignored.join(", "));
            }
            Ok(EnvironmentContext::new(*winner))
        }
    }
}
