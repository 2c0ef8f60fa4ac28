//! Flag parsing, the file-list compile path, and the REPL (spec §6).
//!
//! A file named on the command line is compiled as its own root; everything
//! it transitively imports is discovered and resolved by
//! [`lemc_driver::compile`]. With no files, or after `-i`, [`run_repl`] takes
//! over: it reads module text from stdin until two consecutive blank lines,
//! compiles the buffered text as a synthetic root named `repl`, and loops
//! until EOF. A line starting with `$` is never added to that buffer; it is
//! a shell escape, dispatched to the host shell instead.

use clap::Parser;
use lemc_base::{DiagnosticLog, LemError};
use lemc_driver::{compile, CompilerArena, Options, SYMBOL_ERROR_EXIT_CODE};
use lemc_parser::ast::AstArena;
use lemc_resolve::{FsSource, ModuleSource};
use std::io::{self, BufRead, IsTerminal};
use std::process::{Command, ExitStatus};

/// Parses `argv`, then either compiles the named files or enters the REPL.
/// Returns the process exit code (spec §6's mapping).
pub fn run_cli() -> i32 {
    let _ = env_logger::try_init();
    let options = Options::parse();

    if options.trace_options() {
        log::debug!(target: "lemc_cli", "{options:?}");
    }

    if options.files.is_empty() {
        return run_repl(&options);
    }

    let mut exit_code = 0;
    for file in &options.files {
        let storage = CompilerArena::new();
        let ast = storage.ast();
        let code = run_compile(ast, FsSource, file, &options);
        exit_code = exit_code.max(code);
    }

    if options.interactive {
        exit_code = exit_code.max(run_repl(&options));
    }

    exit_code
}

/// Runs the front end over one root and reports the outcome to stderr
/// through the same bounded [`DiagnosticLog`] a long-running REPL session
/// relies on, rather than printing each diagnostic as it arrives. Shared by
/// the file-list path and every REPL iteration.
fn run_compile<L: ModuleSource>(ast: AstArena<'_>, loader: L, root: &str, options: &Options) -> i32 {
    match compile(ast, loader, root, options) {
        Ok(result) => {
            let colored = io::stderr().is_terminal();
            let has_errors = result.has_errors();
            let log = DiagnosticLog::new(result.diagnostics.len().max(1), colored);
            for diagnostic in result.diagnostics {
                log.push(diagnostic);
            }
            log.flush();
            if has_errors {
                SYMBOL_ERROR_EXIT_CODE
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("lemc: {e}");
            e.exit_code()
        }
    }
}

/// Serves the REPL's accumulated buffer as module `repl.lem`, falling back
/// to the real filesystem for anything it imports.
struct ReplSource {
    text: String,
}

impl ModuleSource for ReplSource {
    fn read(&self, disk_path: &str) -> io::Result<String> {
        if disk_path == "repl.lem" {
            Ok(self.text.clone())
        } else {
            std::fs::read_to_string(disk_path)
        }
    }
}

fn compile_buffer(text: &str, options: &Options) -> i32 {
    let storage = CompilerArena::new();
    let ast = storage.ast();
    run_compile(ast, ReplSource { text: text.to_string() }, "repl", options)
}

/// What one line of REPL input means before it's acted on.
#[derive(Debug, PartialEq, Eq)]
enum ReplLine {
    Blank,
    Shell(ShellDirective),
    Source(String),
}

#[derive(Debug, PartialEq, Eq)]
enum ShellDirective {
    /// Bare `$`: open an interactive host shell.
    Interactive,
    /// `$<command>`: run `<command>` through the host shell and return.
    Command(String),
}

fn classify(line: &str) -> ReplLine {
    if let Some(rest) = line.strip_prefix('$') {
        let rest = rest.trim();
        if rest.is_empty() {
            ReplLine::Shell(ShellDirective::Interactive)
        } else {
            ReplLine::Shell(ShellDirective::Command(rest.to_string()))
        }
    } else if line.trim().is_empty() {
        ReplLine::Blank
    } else {
        ReplLine::Source(line.to_string())
    }
}

/// Reads modules from stdin until EOF, compiling each one after two
/// consecutive blank lines. Returns the worst exit code seen.
fn run_repl(options: &Options) -> i32 {
    let stdin = io::stdin();
    let mut buffer = String::new();
    let mut blank_run = 0u32;
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("lemc: error reading stdin: {e}");
                break;
            }
        };

        match classify(&line) {
            ReplLine::Shell(directive) => run_shell_directive(directive),
            ReplLine::Blank => {
                blank_run += 1;
                if blank_run == 2 {
                    if !buffer.trim().is_empty() {
                        exit_code = exit_code.max(compile_buffer(&buffer, options));
                        buffer.clear();
                    }
                    blank_run = 0;
                }
            }
            ReplLine::Source(text) => {
                blank_run = 0;
                buffer.push_str(&text);
                buffer.push('\n');
            }
        }
    }

    if !buffer.trim().is_empty() {
        exit_code = exit_code.max(compile_buffer(&buffer, options));
    }

    exit_code
}

fn run_shell_directive(directive: ShellDirective) {
    let result = match directive {
        ShellDirective::Interactive => spawn_interactive_shell(),
        ShellDirective::Command(command) => spawn_shell_command(&command),
    };
    match result {
        Ok(status) if !status.success() => {
            if let Some(code) = status.code() {
                eprintln!("lemc: shell exited with status {code}");
            }
        }
        Ok(_) => {}
        Err(e) => eprintln!("lemc: {e}"),
    }
}

/// Wraps the underlying `io::Error` as [`LemError::Shell`] (spec §7's
/// compiler-internal taxonomy), rather than letting a bare `io::Error`
/// surface directly — the one call site in this crate where that variant
/// is actually produced rather than just tested.
#[cfg(unix)]
fn host_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

#[cfg(unix)]
fn spawn_interactive_shell() -> lemc_base::Result<ExitStatus> {
    Command::new(host_shell()).status().map_err(|e| LemError::Shell(e.to_string()))
}

#[cfg(unix)]
fn spawn_shell_command(command: &str) -> lemc_base::Result<ExitStatus> {
    Command::new(host_shell())
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|e| LemError::Shell(e.to_string()))
}

#[cfg(windows)]
fn host_shell() -> String {
    std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
}

#[cfg(windows)]
fn spawn_interactive_shell() -> lemc_base::Result<ExitStatus> {
    Command::new(host_shell()).status().map_err(|e| LemError::Shell(e.to_string()))
}

#[cfg(windows)]
fn spawn_shell_command(command: &str) -> lemc_base::Result<ExitStatus> {
    Command::new(host_shell())
        .arg("/C")
        .arg(command)
        .status()
        .map_err(|e| LemError::Shell(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_blank_lines() {
        assert_eq!(classify(""), ReplLine::Blank);
        assert_eq!(classify("   "), ReplLine::Blank);
    }

    #[test]
    fn classifies_bare_dollar_as_interactive_shell() {
        assert_eq!(classify("$"), ReplLine::Shell(ShellDirective::Interactive));
        assert_eq!(classify("$   "), ReplLine::Shell(ShellDirective::Interactive));
    }

    #[test]
    fn classifies_dollar_command_as_shell_command() {
        assert_eq!(
            classify("$ls -la"),
            ReplLine::Shell(ShellDirective::Command("ls -la".to_string()))
        );
    }

    #[test]
    fn classifies_ordinary_text_as_source() {
        assert_eq!(classify("let x: int32 = 1;"), ReplLine::Source("let x: int32 = 1;".to_string()));
    }

    #[test]
    fn compiles_a_clean_buffer_with_exit_code_zero() {
        let options = Options::parse_from(["lemc"]);
        assert_eq!(compile_buffer("let x: int32 = 1;", &options), 0);
    }

    #[test]
    fn compiling_undeclared_identifier_exits_with_symbol_error_code() {
        let options = Options::parse_from(["lemc"]);
        assert_eq!(compile_buffer("let y = missing;", &options), SYMBOL_ERROR_EXIT_CODE);
    }

    #[test]
    fn repl_source_falls_back_to_filesystem_for_imports() {
        let dir = tempfile::tempdir().unwrap();
        let helper_path = dir.path().join("helper.lem");
        std::fs::write(&helper_path, "pub struct Empty {}").unwrap();
        let source = ReplSource {
            text: "import \"helper\";".to_string(),
        };
        let read = source.read(helper_path.to_str().unwrap());
        assert!(read.is_ok());
    }
}
