use ccwrap::diagnostic::select_formatter;
use ccwrap::driver::{CompilerDriver, GDB_HELP, Invocation, ResolveError, SystemRunner, Toolchain, resolve};
use ccwrap::platform::Platform;
use std::process::exit;

/// The main entry point for the application.
///
/// Parses command-line arguments and runs the driver.
fn main() {
    if !run() {
        exit(1);
    }
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).try_init();
}

/// Resolves the options, builds, and runs the follow-up action.
///
/// Returns `false` if the process should exit with a failure status.
fn run() -> bool {
    let platform = Platform::host();
    let argv = std::env::args_os().map(|a| a.to_string_lossy().into_owned()).collect();

    let config = match resolve(argv, &platform) {
        Ok(Invocation::GdbHelp) => {
            println!("{}", GDB_HELP);
            return true;
        }
        Ok(Invocation::Build(config)) => config,
        Err(ResolveError::Cli(err)) => {
            let _ = err.print();
            // --help and --version land here too
            return !err.use_stderr();
        }
        Err(ResolveError::Config(err)) => {
            let _ = err.into_clap_error().print();
            return false;
        }
    };

    init_logger(config.verbose);
    log::debug!("resolved configuration: {:?}", config);

    let formatter = select_formatter(config.color);
    let mut driver = CompilerDriver::new(config, Toolchain::from_env(), platform, formatter, SystemRunner::new());
    match driver.run() {
        Ok(()) => true,
        Err(err) => {
            driver.print_error(&err);
            false
        }
    }
}
