// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Project automation for the Lifeline workspace.
//!
//! - `cargo xtask ci` runs lint, build, test and migration verification
//! - `cargo xtask verify-migrations` applies the `SQLite` migrations to an
//!   in-memory database, checks the resulting schema, reverts every
//!   migration and applies them again
//!
//! Everything runs against `SQLite`; no external services are needed.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::BTreeSet;
use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence layer expects after all migrations are applied.
const EXPECTED_TABLES: [&str; 5] = [
    "blood_banks",
    "donors",
    "sos_requests",
    "sos_responses",
    "users",
];

/// Unique indexes that back duplicate detection.
const EXPECTED_UNIQUE_INDEXES: [&str; 2] = [
    "idx_sos_requests_idempotency",
    "idx_sos_responses_request_donor",
];

const ACTIVE_CAP_TRIGGER: &str = "sos_requests_active_cap";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
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
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation builds without warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run all tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib and integration tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Apply, inspect, revert and re-apply the `SQLite` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Deny => deny(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint clippy, docs, formatting and typos
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors for every default package
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
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
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Check for typos using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run lib tests, then doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?;
    Ok(())
}

fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Names of schema objects of one `sqlite_master` type.
fn schema_objects(conn: &mut SqliteConnection, kind: &str) -> Result<BTreeSet<String>> {
    let rows: Vec<SchemaObject> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = ? AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations'",
    )
    .bind::<Text, _>(kind)
    .load(conn)
    .wrap_err_with(|| format!("failed to list {kind} objects"))?;
    Ok(rows.into_iter().map(|row| row.name).collect())
}

fn check_schema(conn: &mut SqliteConnection) -> Result<()> {
    let tables: BTreeSet<String> = schema_objects(conn, "table")?;
    let expected: BTreeSet<String> = EXPECTED_TABLES.iter().map(|t| (*t).to_string()).collect();
    if tables != expected {
        return Err(eyre!(
            "table mismatch: expected {expected:?}, found {tables:?}"
        ));
    }

    let indexes: BTreeSet<String> = schema_objects(conn, "index")?;
    for index in EXPECTED_UNIQUE_INDEXES {
        if !indexes.contains(index) {
            return Err(eyre!("missing unique index {index}"));
        }
    }

    let triggers: BTreeSet<String> = schema_objects(conn, "trigger")?;
    if !triggers.contains(ACTIVE_CAP_TRIGGER) {
        return Err(eyre!("missing trigger {ACTIVE_CAP_TRIGGER}"));
    }

    tracing::debug!(?tables, ?indexes, ?triggers, "schema objects");
    Ok(())
}

/// Verify the migrations apply cleanly, produce the expected schema and
/// revert without leaving objects behind.
fn verify_migrations() -> Result<()> {
    tracing::info!("Applying SQLite migrations");
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("failed to enable foreign keys")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to apply migrations: {e}"))?;
    check_schema(&mut conn)?;

    tracing::info!("Reverting SQLite migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to revert migrations: {e}"))?;
    let leftover: BTreeSet<String> = schema_objects(&mut conn, "table")?;
    if !leftover.is_empty() {
        return Err(eyre!("tables left after revert: {leftover:?}"));
    }

    tracing::info!("Re-applying SQLite migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to re-apply migrations: {e}"))?;
    check_schema(&mut conn)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
