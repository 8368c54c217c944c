// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Workspace automation for the complaint desk.
//!
//! - `cargo xtask ci` runs lint, dependency checks, build and tests
//! - `cargo xtask serve --directory <snapshot.json>` runs the server locally
//!
//! Every test runs against in-memory `SQLite` or the in-memory sheet, so
//! `cargo xtask test` needs no external services.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Lint, dependency checks, build and tests
    CI,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Type-check every target
    #[command(visible_alias = "c")]
    Check,

    /// Write an lcov coverage report to `target/lcov.info`
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check licenses and advisories with cargo-deny
    #[command(visible_alias = "cd")]
    Deny,

    /// Look for unused dependencies with cargo-machete
    #[command(visible_alias = "m")]
    Machete,

    /// Clippy, docs, formatting and typos
    #[command(visible_alias = "l")]
    Lint,

    /// Clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build docs for every workspace crate with warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check spelling
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Apply formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Apply spelling fixes
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Unit tests, then doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Doc tests only
    #[command(visible_alias = "td")]
    TestDocs,

    /// Unit tests only
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Run the server against a directory snapshot
    #[command(visible_alias = "s")]
    Serve {
        /// Path to the directory snapshot JSON file
        #[arg(long)]
        directory: String,

        /// Path to the `SQLite` database file; in-memory when omitted
        #[arg(long)]
        database: Option<String>,

        /// Port to bind the server to
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => cargo(Toolchain::Default, &["build", "--all-targets", "--all-features"]),
            Self::Check => cargo(Toolchain::Default, &["check", "--all-targets", "--all-features"]),
            Self::Coverage => cargo(
                Toolchain::Default,
                &[
                    "llvm-cov",
                    "--lcov",
                    "--output-path",
                    "target/lcov.info",
                    "--all-features",
                ],
            ),
            Self::Deny => cargo(Toolchain::Default, &["deny", "check"]),
            Self::Machete => tool("cargo-machete", &[]),
            Self::Lint => lint(),
            Self::LintClippy => clippy(false),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => cargo(Toolchain::Nightly, &["fmt", "--all", "--check"]),
            Self::LintTypos => tool("typos", &[]),
            Self::FixClippy => clippy(true),
            Self::FixFormatting => cargo(Toolchain::Nightly, &["fmt", "--all"]),
            Self::FixTypos => tool("typos", &["-w"]),
            Self::Test => test(),
            Self::TestDocs => cargo(Toolchain::Default, &["test", "--doc", "--all-features"]),
            Self::TestLibs => cargo(
                Toolchain::Default,
                &["test", "--all-targets", "--all-features"],
            ),
            Self::Serve {
                directory,
                database,
                port,
            } => serve(&directory, database.as_deref(), port),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    Command::Deny.run()?;
    Command::Machete.run()?;
    Command::Build.run()?;
    test()
}

fn lint() -> Result<()> {
    clippy(false)?;
    lint_docs()?;
    Command::LintFormatting.run()?;
    Command::LintTypos.run()
}

fn test() -> Result<()> {
    Command::TestLibs.run()?;
    // Doc tests are the slow part.
    Command::TestDocs.run()
}

/// Runs clippy over every target, optionally applying its fixes.
fn clippy(fix: bool) -> Result<()> {
    let mut args: Vec<&str> = vec!["clippy", "--all-targets", "--all-features"];
    if fix {
        args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
    }
    args.extend(["--", "-D", "warnings"]);
    cargo(Toolchain::Default, &args)
}

/// Builds each default workspace crate's docs the way docs.rs would.
fn lint_docs() -> Result<()> {
    let metadata = MetadataCommand::new()
        .exec()
        .wrap_err("failed to read cargo metadata")?;

    for package in metadata.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }
    Ok(())
}

/// Runs the server binary against a directory snapshot.
fn serve(directory: &str, database: Option<&str>, port: u16) -> Result<()> {
    let port: String = port.to_string();
    let mut args: Vec<&str> = vec![
        "run",
        "--package",
        "complaint-desk-server",
        "--",
        "--directory",
        directory,
        "--port",
        &port,
    ];
    if let Some(database) = database {
        args.extend(["--database", database]);
    }
    cargo(Toolchain::Default, &args)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Toolchain {
    Default,
    Nightly,
}

fn cargo(toolchain: Toolchain, args: &[&str]) -> Result<()> {
    let mut expression: duct::Expression = cmd("cargo", args.iter().copied());
    if toolchain == Toolchain::Nightly {
        // Inside `cargo xtask` the CARGO variable pins the outer toolchain.
        expression = expression
            .env_remove("CARGO")
            .env("RUSTUP_TOOLCHAIN", "nightly");
    }
    expression.run_with_trace()?;
    Ok(())
}

fn tool(program: &str, args: &[&str]) -> Result<()> {
    cmd(program, args.iter().copied()).run_with_trace()?;
    Ok(())
}

/// Logs a `duct::Expression` before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command may have scrolled off the screen by now.
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
