use super::cli::{Config, Invocation, resolve};
use super::command::CommandLine;
use super::compiler::{CompilerDriver, DriverError};
use super::process::{Captured, Outcome, ProcessRunner};
use super::toolchain::Toolchain;
use crate::diagnostic::PlainFormatter;
use crate::platform::{OsFamily, Platform};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use tempfile::TempDir;

/// Records every command and answers from a script keyed by full command line or program name.
#[derive(Default, Clone)]
struct ScriptedRunner {
    captured: Vec<CommandLine>,
    interactive: Vec<CommandLine>,
    replies: HashMap<String, Captured>,
    missing: HashSet<String>,
    interactive_outcome: Option<Outcome>,
}

impl ScriptedRunner {
    fn reply(mut self, program: &str, captured: Captured) -> Self {
        self.replies.insert(program.to_string(), captured);
        self
    }

    fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    fn programs(&self) -> Vec<&str> {
        self.captured.iter().map(|c| c.program.as_str()).collect()
    }

    fn compiler(&self) -> &CommandLine {
        self.captured
            .iter()
            .find(|c| c.program == "cc" || c.program == "cc++")
            .expect("compiler never ran")
    }
}

impl ProcessRunner for ScriptedRunner {
    fn capture(&mut self, cmd: &CommandLine) -> io::Result<Captured> {
        self.captured.push(cmd.clone());
        if self.missing.contains(&cmd.program) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not found"));
        }
        Ok(self
            .replies
            .get(&cmd.to_string())
            .or_else(|| self.replies.get(&cmd.program))
            .cloned()
            .unwrap_or_else(Captured::success))
    }

    fn interactive(&mut self, cmd: &CommandLine) -> io::Result<Outcome> {
        self.interactive.push(cmd.clone());
        Ok(self.interactive_outcome.unwrap_or(Outcome::Success))
    }
}

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(flags: &[&str], files: &[&str], program_args: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut argv = vec!["ccwrap".to_string()];
        argv.extend(flags.iter().map(|f| f.to_string()));
        for name in files {
            let path = dir.path().join(name);
            fs::write(&path, "").unwrap();
            argv.push(path.to_string_lossy().into_owned());
        }
        if !program_args.is_empty() {
            argv.push("--".to_string());
            argv.extend(program_args.iter().map(|a| a.to_string()));
        }
        let Ok(Invocation::Build(config)) = resolve(argv, &Platform::new(OsFamily::Unix)) else {
            panic!("fixture did not resolve to a build");
        };
        Self { dir, config }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    fn run(&self, runner: ScriptedRunner) -> (Result<(), DriverError>, ScriptedRunner) {
        let mut driver = CompilerDriver::new(
            self.config.clone(),
            Toolchain::default(),
            Platform::new(OsFamily::Unix),
            Box::new(PlainFormatter),
            runner,
        );
        let result = driver.run();
        (result, driver.runner().clone())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn contains_seq(args: &[String], seq: &[&str]) -> bool {
    args.windows(seq.len()).any(|w| w.iter().zip(seq).all(|(a, b)| a == b))
}

#[test]
fn plain_c_build() {
    let fx = Fixture::new(&[], &["foo.c"], &[]);
    let (result, runner) = fx.run(ScriptedRunner::default());
    assert!(result.is_ok());
    assert_eq!(runner.programs(), vec!["cc"]);
    let expected = strings(&["-x", "c", "-ansi", "-Wall", "-Wextra", "-pedantic", "-o", &fx.path("foo"), &fx.path("foo.c")]);
    assert_eq!(runner.compiler().args, expected);
    assert!(runner.interactive.is_empty());
}

#[test]
fn cpp_compile_only() {
    let fx = Fixture::new(&["-c"], &["a.cpp", "b.cpp"], &[]);
    let (result, runner) = fx.run(ScriptedRunner::default());
    assert!(result.is_ok());
    let cmd = runner.compiler();
    assert_eq!(cmd.program, "cc++");
    let expected = strings(&[
        "-x",
        "c++",
        "-ansi",
        "-fexceptions",
        "-c",
        "-Wall",
        "-Wextra",
        "-pedantic",
        "-Weffc++",
        "-Wold-style-cast",
        "-o",
        &fx.path("a.o"),
        &fx.path("a.cpp"),
        &fx.path("b.cpp"),
    ]);
    assert_eq!(cmd.args, expected);
}

#[test]
fn argument_order() {
    let fx = Fixture::new(&["-p", "-DX -I.", "-O", "-w", "-l", "m", "-o", "prog"], &["main.c"], &[]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    let expected = strings(&["-x", "c", "-ansi", "-DX", "-I.", "-O2", "-o", "prog", &fx.path("main.c"), "-l", "m"]);
    assert_eq!(runner.compiler().args, expected);
}

#[test]
fn shared_library() {
    let fx = Fixture::new(&["-s"], &["lib.c"], &[]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    let args = &runner.compiler().args;
    assert!(contains_seq(args, &["-fPIC", "-shared"]));
    assert!(contains_seq(args, &["-o", &fx.path("lib.so")]));
}

#[test]
fn lexer_output_replaces_its_input() {
    let fx = Fixture::new(&[], &["scan.l", "main.c"], &[]);
    let (result, runner) = fx.run(ScriptedRunner::default());
    assert!(result.is_ok());
    assert_eq!(runner.programs(), vec!["flex", "cc"]);
    assert_eq!(runner.captured[0].args, strings(&["-o", &fx.path("scan.c"), &fx.path("scan.l")]));

    let args = &runner.compiler().args;
    assert!(!args.contains(&fx.path("scan.l")));
    assert!(args.ends_with(&strings(&[&fx.path("main.c"), &fx.path("scan.c")])));
}

#[test]
fn lexer_output_is_not_duplicated() {
    let fx = Fixture::new(&[], &["scan.l", "scan.c", "scan.l"], &[]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    assert_eq!(runner.programs(), vec!["flex", "cc"]);
    let generated = fx.path("scan.c");
    assert_eq!(runner.compiler().args.iter().filter(|a| **a == generated).count(), 1);
}

#[test]
fn lexer_failure_stops_the_build() {
    let fx = Fixture::new(&["-e"], &["scan.l"], &[]);
    let runner = ScriptedRunner::default().reply("flex", Captured::with_output(Outcome::Failed(1), "", "scan.l:3: bad character\n"));
    let (result, runner) = fx.run(runner);
    let err = result.unwrap_err();
    assert!(matches!(err, DriverError::Lexer { outcome: Outcome::Failed(1), .. }));
    let msg = err.to_string();
    assert!(msg.starts_with("flex returned exit status 1 on"), "{}", msg);
    assert!(msg.ends_with(":\nscan.l:3: bad character"), "{}", msg);
    assert_eq!(runner.programs(), vec!["flex"]);
    assert!(runner.interactive.is_empty());
}

#[test]
fn compiler_failure_skips_the_follow_up() {
    let fx = Fixture::new(&["-e"], &["foo.c"], &[]);
    let runner = ScriptedRunner::default().reply("cc", Captured::with_output(Outcome::Failed(1), "", "foo.c:1:1: error: expected ';'\n"));
    let (result, runner) = fx.run(runner);
    let err = result.unwrap_err();
    assert!(matches!(err, DriverError::CompilationFailed { outcome: Outcome::Failed(1), .. }));
    insta::assert_snapshot!(err.to_string(), @"compilation failed: cc returned exit status 1");
    assert!(runner.interactive.is_empty());
}

#[test]
fn interrupted_compiler() {
    let fx = Fixture::new(&[], &["foo.c"], &[]);
    let runner = ScriptedRunner::default().reply("cc", Captured::with_output(Outcome::Interrupted, "", ""));
    let (result, _) = fx.run(runner);
    insta::assert_snapshot!(result.unwrap_err().to_string(), @"compilation failed: cc terminated by interrupt");
}

#[test]
fn missing_compiler() {
    let fx = Fixture::new(&[], &["foo.c"], &[]);
    let (result, _) = fx.run(ScriptedRunner::default().missing("cc"));
    assert!(matches!(result, Err(DriverError::Spawn { ref program, .. }) if program == "cc"));
}

#[test]
fn execute_runs_the_program_with_its_arguments() {
    let fx = Fixture::new(&["-e"], &["foo.c"], &["-n", "3"]);
    let (result, runner) = fx.run(ScriptedRunner::default());
    assert!(result.is_ok());
    assert_eq!(runner.interactive.len(), 1);
    assert_eq!(runner.interactive[0].program, fx.path("foo"));
    assert_eq!(runner.interactive[0].args, strings(&["-n", "3"]));
}

#[test]
fn failing_program_is_not_a_driver_error() {
    let fx = Fixture::new(&["-e"], &["foo.c"], &[]);
    let runner = ScriptedRunner {
        interactive_outcome: Some(Outcome::Failed(3)),
        ..ScriptedRunner::default()
    };
    let (result, runner) = fx.run(runner);
    assert!(result.is_ok());
    assert_eq!(runner.interactive.len(), 1);
}

#[test]
fn debug_under_gdb() {
    let fx = Fixture::new(&["-g"], &["foo.c"], &[]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    assert!(runner.compiler().args.contains(&"-g".to_string()));
    assert_eq!(runner.interactive[0].program, "gdb");
    assert_eq!(runner.interactive[0].args, vec![fx.path("foo")]);

    let fx = Fixture::new(&["-g"], &["foo.c"], &["in.txt"]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    assert_eq!(runner.interactive[0].args, strings(&["--args", &fx.path("foo"), "in.txt"]));
}

#[test]
fn memory_check_under_valgrind() {
    let fx = Fixture::new(&["--valgrind"], &["foo.c"], &["x"]);
    let (_, runner) = fx.run(ScriptedRunner::default());
    assert!(runner.compiler().args.contains(&"-g".to_string()));
    assert_eq!(runner.interactive[0].program, "valgrind");
    assert_eq!(runner.interactive[0].args, strings(&[&fx.path("foo"), "x"]));
}

#[test]
fn package_flags_go_before_the_output() {
    let fx = Fixture::new(&["--lgtk"], &["ui.c"], &[]);
    let runner = ScriptedRunner::default().reply(
        "pkg-config",
        Captured::with_output(Outcome::Success, "-I/usr/include/gtk-2.0 -lgtk-x11-2.0\n", ""),
    );
    let (result, runner) = fx.run(runner);
    assert!(result.is_ok());
    assert_eq!(runner.captured[0].args, strings(&["--cflags", "--libs", "gtk+-2.0"]));
    assert!(contains_seq(
        &runner.compiler().args,
        &["-pedantic", "-I/usr/include/gtk-2.0", "-lgtk-x11-2.0", "-o"]
    ));
}

#[test]
fn failed_package_lookup_is_ignored() {
    let fx = Fixture::new(&["--lgtk", "--lgtkmm"], &["ui.cpp"], &[]);
    let runner = ScriptedRunner::default()
        .reply(
            "pkg-config --cflags --libs gtk+-2.0",
            Captured::with_output(Outcome::Failed(1), "-Inever/used\n", "Package gtk+-2.0 was not found\n"),
        )
        .reply(
            "pkg-config --cflags --libs gtkmm-2.4",
            Captured::with_output(Outcome::Success, "-I/usr/include/gtkmm-2.4 -lgtkmm-2.4\n", ""),
        );
    let (result, runner) = fx.run(runner);
    assert!(result.is_ok());
    assert_eq!(runner.programs(), vec!["pkg-config", "pkg-config", "cc++"]);
    assert_eq!(runner.captured[0].args, strings(&["--cflags", "--libs", "gtk+-2.0"]));
    assert_eq!(runner.captured[1].args, strings(&["--cflags", "--libs", "gtkmm-2.4"]));

    let args = &runner.compiler().args;
    assert!(!args.contains(&"-Inever/used".to_string()));
    assert!(contains_seq(args, &["-Wold-style-cast", "-I/usr/include/gtkmm-2.4", "-lgtkmm-2.4", "-o"]));

    let (result, _) = fx.run(ScriptedRunner::default().missing("pkg-config"));
    assert!(result.is_ok());
}

#[test]
fn dest_path_is_stable_across_runs() {
    let fx = Fixture::new(&["-c"], &["a.c"], &[]);
    let (_, first) = fx.run(ScriptedRunner::default());
    let (_, second) = fx.run(ScriptedRunner::default());
    assert_eq!(first.compiler(), second.compiler());
}
