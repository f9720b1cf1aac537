//! Toolchain orchestration
//!
//! Runs the lexer generator over `.l` inputs, assembles and runs the compiler,
//! shows its output and, after a successful build, hands the terminal to the
//! program, the debugger or the memory checker.

use itertools::Itertools;
use log::debug;
use std::io;
use std::path::PathBuf;

use super::cli::Config;
use super::command::{CommandLine, compiler_command, lexer_command, pkg_config_command, post_compile_command};
use super::process::{Captured, Outcome, ProcessRunner};
use super::toolchain::{GTK_PACKAGE, GTKMM_PACKAGE, Toolchain};
use crate::diagnostic::OutputFormatter;
use crate::lang_options::{FileKind, classify};
use crate::platform::Platform;

/// Main compiler driver
pub struct CompilerDriver<R: ProcessRunner> {
    config: Config,
    toolchain: Toolchain,
    platform: Platform,
    formatter: Box<dyn OutputFormatter>,
    runner: R,
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() { String::new() } else { format!(":\n{}", output) }
}

/// Error types for the compiler driver
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} {outcome} on {file}{}", output_suffix(.output))]
    Lexer {
        program: String,
        file: String,
        outcome: Outcome,
        output: String,
    },

    #[error("compilation failed: {program} {outcome}")]
    CompilationFailed { program: String, outcome: Outcome },
}

fn spawn_error(cmd: &CommandLine) -> impl FnOnce(io::Error) -> DriverError + '_ {
    move |source| DriverError::Spawn {
        program: cmd.program.clone(),
        source,
    }
}

impl<R: ProcessRunner> CompilerDriver<R> {
    pub fn new(config: Config, toolchain: Toolchain, platform: Platform, formatter: Box<dyn OutputFormatter>, runner: R) -> Self {
        CompilerDriver {
            config,
            toolchain,
            platform,
            formatter,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Print a driver error through the configured formatter
    pub fn print_error(&self, err: &DriverError) {
        self.formatter.error(&err.to_string());
    }

    /// Build the configured sources and run the follow-up action, if any.
    pub fn run(&mut self) -> Result<(), DriverError> {
        for arg in &self.config.ignored_args {
            self.formatter.warning(&format!("ignoring '{}': no such file", arg));
        }

        let sources = self.run_lexer_pass()?;
        let package_flags = self.package_flags();
        let cmd = compiler_command(&self.config, &self.toolchain, &sources, &package_flags);
        debug!("compiler command: {}", cmd);
        if self.config.verbose {
            self.formatter.info(&cmd.to_string());
        }

        let outcome = self.run_compiler(&cmd)?;
        if !outcome.is_success() {
            return Err(DriverError::CompilationFailed {
                program: cmd.program,
                outcome,
            });
        }
        self.formatter
            .info(&format!("built {}", self.config.dest_path.display()));

        self.run_post_compile();
        Ok(())
    }

    /// Replace every `.l` input by the C file the lexer generator writes.
    fn run_lexer_pass(&mut self) -> Result<Vec<PathBuf>, DriverError> {
        let mut sources = self.config.source_files.clone();
        let lexer_inputs = sources
            .iter()
            .filter(|path| classify(path) == FileKind::Flex)
            .unique()
            .cloned()
            .collect_vec();

        for input in lexer_inputs {
            let generated = input.with_extension("c");
            let cmd = lexer_command(&self.toolchain, &input, &generated);
            debug!("lexer command: {}", cmd);
            let captured = self.runner.capture(&cmd).map_err(spawn_error(&cmd))?;
            if !captured.outcome.is_success() {
                return Err(DriverError::Lexer {
                    program: cmd.program,
                    file: input.display().to_string(),
                    outcome: captured.outcome,
                    output: self.combined_output(&captured),
                });
            }

            sources.retain(|path| path != &input);
            if !sources.contains(&generated) {
                sources.push(generated);
            }
        }
        Ok(sources)
    }

    /// Flags from the requested pkg-config lookups. Failed lookups add nothing.
    fn package_flags(&mut self) -> Vec<String> {
        let mut flags = Vec::new();
        for (wanted, package) in [(self.config.gtk, GTK_PACKAGE), (self.config.gtkmm, GTKMM_PACKAGE)] {
            if wanted {
                flags.extend(self.query_package(package));
            }
        }
        flags
    }

    fn query_package(&mut self, package: &str) -> Vec<String> {
        let cmd = pkg_config_command(&self.toolchain, package);
        match self.runner.capture(&cmd) {
            Ok(captured) if captured.outcome.is_success() => self
                .platform
                .decode(&captured.stdout)
                .split_whitespace()
                .map(String::from)
                .collect(),
            Ok(captured) => {
                debug!("{} {}, output discarded", cmd, captured.outcome);
                Vec::new()
            }
            Err(err) => {
                debug!("{} failed to start: {}", cmd, err);
                Vec::new()
            }
        }
    }

    /// Run the compiler and show whatever it printed, warnings included.
    fn run_compiler(&mut self, cmd: &CommandLine) -> Result<Outcome, DriverError> {
        let captured = self.runner.capture(cmd).map_err(spawn_error(cmd))?;
        let text = self.combined_output(&captured);
        if !text.is_empty() {
            let shown = self
                .formatter
                .format_output(&text, self.config.color, self.config.beautify);
            if !shown.is_empty() {
                eprintln!("{}", shown);
            }
        }
        Ok(captured.outcome)
    }

    fn run_post_compile(&mut self) {
        let Some(cmd) = post_compile_command(&self.config, &self.toolchain, &self.platform) else {
            return;
        };
        debug!("post-compile command: {}", cmd);
        match self.runner.interactive(&cmd) {
            Ok(outcome) => self
                .formatter
                .emit(outcome.level(), &format!("{} {}", cmd.program, outcome)),
            Err(err) => self
                .formatter
                .error(&format!("failed to execute {}: {}", cmd.program, err)),
        }
    }

    /// stdout then stderr, decoded, blank parts skipped
    fn combined_output(&self, captured: &Captured) -> String {
        [&captured.stdout, &captured.stderr]
            .into_iter()
            .map(|bytes| self.platform.decode(bytes))
            .filter(|text| !text.trim().is_empty())
            .map(|text| text.trim().to_string())
            .join("\n")
    }
}
