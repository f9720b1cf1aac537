//! CLI parsing and configuration module
//!
//! This module handles command-line argument parsing using clap and turns the
//! parsed flags into the normalized [`Config`] the driver consumes.

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser as CliParser};
use itertools::Itertools;
use std::path::{Path, PathBuf};

use crate::diagnostic::RICH_FORMATTER_AVAILABLE;
use crate::lang_options::{Language, derive_language};
use crate::platform::Platform;

/// Values accepted by `-x/--lang`
pub const LANGUAGES: [&str; 10] = ["asm", "c", "c89", "c99", "cpp", "c++", "c++0x", "c++1x", "flex", "none"];

/// Separator between our own flags and the arguments of the built program
pub const PROGRAM_ARGS_SEPARATOR: &str = "--";

pub const GDB_HELP: &str = "\
Quick gdb reference:
  run [ARGS]        start the program, optionally with new arguments
  break LOCATION    set a breakpoint (function, FILE:LINE or *ADDRESS)
  delete [N]        delete breakpoint N, or all breakpoints
  next / step       step over / into the next source line
  continue          resume until the next breakpoint
  finish            run until the current function returns
  backtrace         show the call stack
  frame N           select stack frame N
  print EXPR        evaluate and print an expression
  display EXPR      print an expression every time the program stops
  watch EXPR        stop when the value of an expression changes
  info locals       show local variables of the selected frame
  list [LOCATION]   show source around the current line or LOCATION
  quit              leave gdb";

/// CLI interface using clap
#[derive(CliParser, Debug)]
#[clap(name = "ccwrap", version, about = "Friendly front-end for the C/C++/assembly toolchain")]
pub struct Cli {
    /// Source files to build
    #[clap(value_name = "FILE")]
    pub files: Vec<String>,

    /// Compile only, do not link
    #[clap(short = 'c', long = "compile")]
    pub compile: bool,

    /// Disable colored output
    #[clap(short = 'C', long = "no-colors")]
    pub no_colors: bool,

    /// Run the program after building it
    #[clap(short = 'e')]
    pub execute: bool,

    /// Build a shared library
    #[clap(short = 's', long = "shared")]
    pub shared: bool,

    /// Compile to assembly only
    #[clap(short = 'S', long = "compile-proper")]
    pub compile_proper: bool,

    /// Preprocess only
    #[clap(short = 'E', long = "preprocess")]
    pub preprocess: bool,

    /// Build with debug symbols and run the program under gdb
    #[clap(short = 'g', long = "debug")]
    pub debug: bool,

    /// Optimize the build
    #[clap(short = 'O', long = "optimize")]
    pub optimize: bool,

    /// Print a short gdb reference and exit
    #[clap(short = 'G', long = "gdb-help")]
    pub gdb_help: bool,

    /// Disable compiler warnings
    #[clap(short = 'w', long = "no-warnings")]
    pub no_warnings: bool,

    /// Source language, overriding detection by extension
    #[clap(short = 'x', long = "lang", value_name = "LANGUAGE", value_parser = LANGUAGES)]
    pub lang: Option<String>,

    /// Use the C++0x standard
    #[clap(long = "0x")]
    pub cpp0x: bool,

    /// Use the C++1x standard
    #[clap(long = "1x")]
    pub cpp1x: bool,

    /// Beautify compiler output (repeat for more)
    #[clap(short = 'b', long = "beautify", action = ArgAction::Count)]
    pub beautify: u8,

    /// Output file
    #[clap(short = 'o', value_name = "FILENAME")]
    pub output: Option<PathBuf>,

    /// Options passed to the compiler as they are
    #[clap(short = 'p', value_name = "OPTIONS", allow_hyphen_values = true, action = ArgAction::Append)]
    pub passthrough: Vec<String>,

    /// Print the commands being run
    #[clap(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Link against a library
    #[clap(short = 'l', value_name = "LIBRARY", action = ArgAction::Append)]
    pub libraries: Vec<String>,

    /// Add the gtk compile and link flags
    #[clap(long = "lgtk")]
    pub gtk: bool,

    /// Add the gtkmm compile and link flags
    #[clap(long = "lgtkmm")]
    pub gtkmm: bool,

    /// Run the program under valgrind after building it
    #[clap(long = "valgrind")]
    pub valgrind: bool,
}

/// The single top-level operation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// link an executable and stop
    #[default]
    Link,
    Compile,
    Execute,
    Shared,
    CompileProper,
    Preprocess,
    Debug,
    Valgrind,
}

impl Mode {
    /// Flags this mode contributes to the compiler command
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Mode::Compile => &["-c"],
            Mode::CompileProper => &["-S"],
            Mode::Preprocess => &["-E"],
            Mode::Shared => &["-fPIC", "-shared"],
            Mode::Link | Mode::Execute | Mode::Debug | Mode::Valgrind => &[],
        }
    }

    pub fn wants_debug_symbols(self) -> bool {
        matches!(self, Mode::Debug | Mode::Valgrind)
    }
}

/// Configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub language: Language,
    pub source_files: Vec<PathBuf>,
    pub dest_path: PathBuf,
    pub optimize: bool,
    pub debug_symbols: bool,
    pub warnings: bool,
    pub color: bool,
    pub verbose: bool,
    pub beautify: u8,
    pub passthrough: Vec<String>,
    pub libraries: Vec<String>,
    pub gtk: bool,
    pub gtkmm: bool,
    /// arguments after `--`, handed to the built program
    pub program_args: Vec<String>,
    /// positional arguments that named no existing file
    pub ignored_args: Vec<String>,
}

/// Usage errors found while building a [`Config`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("conflicting options: {}", .0.join(", "))]
    ConflictingModes(Vec<&'static str>),

    /// carries the positional arguments that named no existing file
    #[error("no input files{}", missing_suffix(.0))]
    NoInputFiles(Vec<String>),
}

fn missing_suffix(missing: &[String]) -> String {
    if missing.is_empty() { String::new() } else { format!(" (no such file: {})", missing.join(", ")) }
}

impl ConfigError {
    /// Render through clap so usage errors look like parse errors.
    pub fn into_clap_error(self) -> clap::Error {
        let kind = match self {
            ConfigError::ConflictingModes(_) => ErrorKind::ArgumentConflict,
            ConfigError::NoInputFiles(_) => ErrorKind::MissingRequiredArgument,
        };
        Cli::command().error(kind, self)
    }
}

/// Result of resolving the command line
#[derive(Debug)]
pub enum Invocation {
    /// print [`GDB_HELP`] and stop
    GdbHelp,
    Build(Config),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Split argv at the first `--`; the tail belongs to the built program.
pub fn split_program_args(mut argv: Vec<String>) -> (Vec<String>, Vec<String>) {
    match argv.iter().skip(1).position(|a| a == PROGRAM_ARGS_SEPARATOR) {
        Some(pos) => {
            let mut tail = argv.split_off(pos + 1);
            tail.remove(0);
            (argv, tail)
        }
        None => (argv, Vec::new()),
    }
}

/// Resolve a full argv (program name first) into an [`Invocation`].
pub fn resolve(argv: Vec<String>, platform: &Platform) -> Result<Invocation, ResolveError> {
    let (own, program_args) = split_program_args(argv);
    let cli = Cli::try_parse_from(own)?;
    if cli.gdb_help {
        return Ok(Invocation::GdbHelp);
    }
    Ok(Invocation::Build(cli.into_config(program_args, platform)?))
}

/// Output path used when `-o` is absent, in priority order of the mode.
pub fn derive_dest_path(explicit: Option<&Path>, mode: Mode, first_source: &Path, platform: &Platform) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match mode {
        Mode::Compile => first_source.with_extension("o"),
        Mode::CompileProper => first_source.with_extension("s"),
        Mode::Preprocess => first_source.with_extension("ii"),
        Mode::Shared => first_source.with_extension("so"),
        _ => first_source.with_extension(platform.exe_suffix().unwrap_or_default()),
    }
}

impl Cli {
    fn selected_modes(&self) -> Vec<(&'static str, Mode)> {
        [
            (self.compile, "-c/--compile", Mode::Compile),
            (self.execute, "-e", Mode::Execute),
            (self.compile_proper, "-S/--compile-proper", Mode::CompileProper),
            (self.debug, "-g/--debug", Mode::Debug),
            (self.preprocess, "-E/--preprocess", Mode::Preprocess),
            (self.valgrind, "--valgrind", Mode::Valgrind),
            (self.shared, "-s/--shared", Mode::Shared),
        ]
        .into_iter()
        .filter(|(set, ..)| *set)
        .map(|(_, name, mode)| (name, mode))
        .collect()
    }

    /// Convert CLI arguments into a validated configuration
    pub fn into_config(self, program_args: Vec<String>, platform: &Platform) -> Result<Config, ConfigError> {
        let modes = self.selected_modes();
        let mode = match modes.as_slice() {
            [] => Mode::Link,
            [(_, mode)] => *mode,
            _ => {
                return Err(ConfigError::ConflictingModes(modes.iter().map(|(name, _)| *name).collect()));
            }
        };

        let (source_files, ignored_args): (Vec<_>, Vec<_>) =
            self.files.into_iter().partition(|f| Path::new(f).exists());
        let source_files: Vec<PathBuf> = source_files.into_iter().map(PathBuf::from).collect();
        let Some(first) = source_files.first() else {
            return Err(ConfigError::NoInputFiles(ignored_args));
        };

        let language = if self.cpp0x || self.cpp1x {
            Language::Cpp11
        } else if let Some(lang) = &self.lang {
            Language::from(lang.as_str())
        } else {
            derive_language(&source_files)
        };

        let dest_path = derive_dest_path(self.output.as_deref(), mode, first, platform);

        let passthrough = self
            .passthrough
            .iter()
            .flat_map(|opts| opts.split_whitespace())
            .map(String::from)
            .collect_vec();

        Ok(Config {
            mode,
            language,
            dest_path,
            source_files,
            optimize: self.optimize,
            debug_symbols: mode.wants_debug_symbols(),
            warnings: !self.no_warnings,
            color: RICH_FORMATTER_AVAILABLE && !self.no_colors,
            verbose: self.verbose,
            beautify: self.beautify,
            passthrough,
            libraries: self.libraries,
            gtk: self.gtk,
            gtkmm: self.gtkmm,
            program_args,
            ignored_args,
        })
    }
}
