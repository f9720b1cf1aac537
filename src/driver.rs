// Compiler driver module

pub mod cli;
pub mod command;
pub mod compiler;
pub mod process;
pub mod toolchain;

#[cfg(test)]
mod tests_compiler;

pub use cli::{Cli, Config, ConfigError, GDB_HELP, Invocation, Mode, ResolveError, resolve};
pub use compiler::{CompilerDriver, DriverError};
pub use process::{Outcome, ProcessRunner, SystemRunner};
pub use toolchain::Toolchain;
