//! Names of the external programs the driver launches.

use std::env;

use crate::lang_options::Language;

/// pkg-config package queried by `--lgtk`
pub const GTK_PACKAGE: &str = "gtk+-2.0";
/// pkg-config package queried by `--lgtkmm`
pub const GTKMM_PACKAGE: &str = "gtkmm-2.4";

/// Program names, overridable through `CCWRAP_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
    pub lex: String,
    pub debugger: String,
    pub memcheck: String,
    pub pkg_config: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cc: "cc".to_string(),
            cxx: "cc++".to_string(),
            lex: "flex".to_string(),
            debugger: "gdb".to_string(),
            memcheck: "valgrind".to_string(),
            pkg_config: "pkg-config".to_string(),
        }
    }
}

fn env_or(var: &str, default: String) -> String {
    match env::var(var) {
        Ok(value) if !value.is_empty() => {
            log::debug!("{} overridden by {}={}", default, var, value);
            value
        }
        _ => default,
    }
}

impl Toolchain {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cc: env_or("CCWRAP_CC", defaults.cc),
            cxx: env_or("CCWRAP_CXX", defaults.cxx),
            lex: env_or("CCWRAP_LEX", defaults.lex),
            debugger: env_or("CCWRAP_GDB", defaults.debugger),
            memcheck: env_or("CCWRAP_VALGRIND", defaults.memcheck),
            pkg_config: env_or("CCWRAP_PKG_CONFIG", defaults.pkg_config),
        }
    }

    /// Compiler front-end for a language
    pub fn compiler_for(&self, language: Language) -> &str {
        if language.is_cpp() { &self.cxx } else { &self.cc }
    }
}
