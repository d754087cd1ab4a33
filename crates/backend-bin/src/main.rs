//! `authcore` command-line tool.
//!
//! Hashes and verifies credentials, audits and migrates user lists, and
//! prints the effective configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use authcore_common::UserRecord;
use authcore_lib::{
    auth::{hash_password_secure, verify_password},
    config::Settings,
    credentials,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "authcore")]
#[command(about = "Credential and session security tooling")]
struct Cli {
    /// Settings file (defaults to ./authcore.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the encoded credential for a password
    Hash {
        password: String,
        /// Use this salt instead of a random one
        #[arg(long)]
        salt: Option<String>,
    },
    /// Check a password against an encoded credential (exit 1 on mismatch)
    Verify { password: String, encoded: String },
    /// Report plaintext and malformed credentials in a users file
    Audit {
        /// JSON array of user objects
        file: PathBuf,
    },
    /// Hash every plaintext password in a users file
    Migrate {
        file: PathBuf,
        /// Write here instead of rewriting the input (no backup is made)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the validated settings
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("loading settings")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Hash { mut password, salt } => {
            let encoded = hash_password_secure(&mut password, salt.as_deref())?;
            println!("{encoded}");
        },
        Commands::Verify { password, encoded } => {
            if !verify_password(&password, &encoded) {
                println!("mismatch");
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        },
        Commands::Audit { file } => {
            let (_, users) = read_users(&file)?;
            let report = credentials::audit(&users);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Migrate { file, output } => migrate(&file, output.as_deref())?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Read a users file as raw JSON values plus typed records, index-aligned
fn read_users(path: &Path) -> Result<(Vec<Value>, Vec<UserRecord>)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    let users = values
        .iter()
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<UserRecord>, _>>()
        .with_context(|| format!("parsing users in {}", path.display()))?;
    Ok((values, users))
}

fn migrate(file: &Path, output: Option<&Path>) -> Result<()> {
    let (mut values, mut users) = read_users(file)?;

    let migrated = credentials::migrate_plaintext(&mut users)?;
    if migrated == 0 {
        tracing::info!(file = %file.display(), "no plaintext passwords found");
        println!("nothing to migrate");
        return Ok(());
    }
    credentials::verify_migration(&users)?;

    // Only the password field is rewritten; fields the core does not
    // model survive untouched.
    for (value, user) in values.iter_mut().zip(&users) {
        match value.as_object_mut() {
            Some(object) => {
                object.insert("password".to_string(), Value::String(user.password.clone()));
            },
            None => bail!("user entry for {} is not an object", user.login),
        }
    }

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let backup = backup_path(file);
            fs::copy(file, &backup)
                .with_context(|| format!("writing backup {}", backup.display()))?;
            tracing::info!(backup = %backup.display(), "backup created");
            file.to_path_buf()
        },
    };

    let json = serde_json::to_string_pretty(&values)?;
    fs::write(&target, json).with_context(|| format!("writing {}", target.display()))?;

    let (_, written) = read_users(&target)?;
    credentials::verify_migration(&written)?;

    tracing::info!(migrated, target = %target.display(), "migration complete");
    println!("migrated {migrated} of {} users", written.len());
    Ok(())
}

fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
