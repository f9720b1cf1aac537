//! A friendly front-end for the C/C++/assembly toolchain.

/// Contains user-facing messages and compiler output formatting.
pub mod diagnostic;
/// Contains option resolution and toolchain orchestration.
pub mod driver;
pub mod lang_options;
pub mod platform;
