// src/aptly/mod.rs

//! Boundary to the aptly command-line tool
//!
//! All process spawning lives here. Read-only queries go through
//! [`Aptly::query`], which folds every failure into `None`. Mutations go
//! through [`Aptly::mutate`], which honours the execution mode: in
//! [`ExecMode::DryRun`] the command is printed instead of executed.

pub mod listing;
pub mod mock;

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Captured result of one aptly invocation
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes aptly with a list of arguments
pub trait AptlyRunner {
    /// Run aptly with `args` (without the program name)
    ///
    /// An `Err` means aptly could not be started at all. A non-zero exit is
    /// reported through `ToolOutput::success`.
    fn run(&self, args: &[String]) -> Result<ToolOutput>;
}

/// Runs the real aptly binary
#[derive(Debug, Clone)]
pub struct AptlyCli {
    program: String,
    config: Option<PathBuf>,
}

impl AptlyCli {
    pub fn new(program: impl Into<String>, config: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            config,
        }
    }
}

impl AptlyRunner for AptlyCli {
    fn run(&self, args: &[String]) -> Result<ToolOutput> {
        let mut command = Command::new(&self.program);
        if let Some(config) = &self.config {
            command.arg(format!("-config={}", config.display()));
        }
        command.args(args);

        let output = match command.output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ExternalTool {
                    command: args.first().cloned().unwrap_or_default(),
                    message: format!("failed to run {}: {}. Is aptly installed?", self.program, e),
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Whether mutating commands are executed or only printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    #[default]
    Live,
    DryRun,
}

/// aptly handle shared by every manager
pub struct Aptly {
    runner: Box<dyn AptlyRunner>,
    mode: ExecMode,
}

impl Aptly {
    pub fn new(runner: Box<dyn AptlyRunner>, mode: ExecMode) -> Self {
        Self { runner, mode }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Run a read-only query, returning stdout on success
    pub fn query<S: AsRef<str>>(&self, args: &[S]) -> Option<String> {
        let args = to_owned_args(args);
        debug!("aptly query: {}", args.join(" "));

        match self.runner.run(&args) {
            Ok(output) if output.success => Some(output.stdout),
            Ok(output) => {
                debug!(
                    "aptly {} returned failure: {}",
                    args.join(" "),
                    first_line(&output.stderr)
                );
                None
            }
            Err(e) => {
                debug!("aptly {} could not run: {}", args.join(" "), e);
                None
            }
        }
    }

    /// Run a mutating command, or print it in dry-run mode
    pub fn mutate<S: AsRef<str>>(&self, operation: &str, args: &[S]) -> Result<()> {
        let args = to_owned_args(args);

        if self.mode == ExecMode::DryRun {
            println!("[dry-run] {}: aptly {}", operation, args.join(" "));
            return Ok(());
        }

        info!("{}: aptly {}", operation, args.join(" "));
        let output = self.runner.run(&args)?;
        if !output.success {
            let message = match first_line(&output.stderr) {
                "" => first_line(&output.stdout).to_string(),
                line => line.to_string(),
            };
            return Err(Error::ExternalTool {
                command: args.iter().take(2).cloned().collect::<Vec<_>>().join(" "),
                message,
            });
        }

        debug!("aptly output: {}", output.stdout.trim_end());
        Ok(())
    }
}

fn to_owned_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter().map(|a| a.as_ref().to_string()).collect()
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}
