//! Assembly of the command lines the driver runs.

use itertools::Itertools;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::cli::{Config, Mode};
use super::toolchain::Toolchain;
use crate::platform::Platform;

pub const WARNING_FLAGS: [&str; 3] = ["-Wall", "-Wextra", "-pedantic"];
/// added on top of [`WARNING_FLAGS`] for C++
pub const CXX_WARNING_FLAGS: [&str; 2] = ["-Weffc++", "-Wold-style-cast"];
pub const OPTIMIZE_FLAGS: [&str; 1] = ["-O2"];
pub const DEBUG_FLAG: &str = "-g";

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.iter().join(" "))
        }
    }
}

/// Build the compiler invocation.
///
/// The order is fixed: base flags, pass-through options, mode flags, debug and
/// optimization flags, warnings, package flags, output, sources, libraries.
pub fn compiler_command(config: &Config, toolchain: &Toolchain, sources: &[PathBuf], package_flags: &[String]) -> CommandLine {
    let mut cmd = CommandLine::new(toolchain.compiler_for(config.language));
    cmd.args(config.language.base_flags().iter().copied())
        .args(config.passthrough.iter().cloned())
        .args(config.mode.flags().iter().copied());

    if config.debug_symbols {
        cmd.arg(DEBUG_FLAG);
    }
    if config.optimize {
        cmd.args(OPTIMIZE_FLAGS);
    }
    if config.warnings {
        cmd.args(WARNING_FLAGS);
        if config.language.is_cpp() {
            cmd.args(CXX_WARNING_FLAGS);
        }
    }

    cmd.args(package_flags.iter().cloned())
        .arg("-o")
        .arg(path_arg(&config.dest_path))
        .args(sources.iter().map(|s| path_arg(s)));

    for lib in &config.libraries {
        cmd.arg("-l").arg(lib.as_str());
    }
    cmd
}

/// `flex -o <output> <input>`
pub fn lexer_command(toolchain: &Toolchain, input: &Path, output: &Path) -> CommandLine {
    let mut cmd = CommandLine::new(toolchain.lex.as_str());
    cmd.arg("-o").arg(path_arg(output)).arg(path_arg(input));
    cmd
}

pub fn pkg_config_command(toolchain: &Toolchain, package: &str) -> CommandLine {
    let mut cmd = CommandLine::new(toolchain.pkg_config.as_str());
    cmd.args(["--cflags", "--libs", package]);
    cmd
}

/// The interactive command to run after a successful build, if the mode asks for one.
pub fn post_compile_command(config: &Config, toolchain: &Toolchain, platform: &Platform) -> Option<CommandLine> {
    let program = path_arg(&platform.run_path(&config.dest_path));
    let cmd = match config.mode {
        Mode::Execute => {
            let mut cmd = CommandLine::new(program);
            cmd.args(config.program_args.iter().cloned());
            cmd
        }
        Mode::Debug => {
            let mut cmd = CommandLine::new(toolchain.debugger.as_str());
            if !config.program_args.is_empty() {
                cmd.arg("--args");
            }
            cmd.arg(program).args(config.program_args.iter().cloned());
            cmd
        }
        Mode::Valgrind => {
            let mut cmd = CommandLine::new(toolchain.memcheck.as_str());
            cmd.arg(program).args(config.program_args.iter().cloned());
            cmd
        }
        _ => return None,
    };
    Some(cmd)
}
