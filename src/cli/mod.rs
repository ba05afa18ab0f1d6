//! CLI routing and command dispatch.

use crate::core::paths::KeyfilePaths;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod init;
pub mod list;
pub mod record;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: KeyfilePaths,
    pub non_interactive: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "apikey-vault",
    version,
    about = "Local file-backed API key store, indexed by account and domain"
)]
pub struct Cli {
    /// Directory holding the key file
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Name of the key file inside the directory
    #[arg(long, global = true, value_name = "NAME")]
    pub file: Option<String>,

    /// Run without prompts (keys must come from --from-stdin)
    #[arg(long, global = true, env = "APIKEY_VAULT_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let paths = KeyfilePaths::resolve(self.dir, self.file)?;
        let ctx = CliContext {
            paths,
            non_interactive: self.non_interactive,
        };
        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::List(args) => list::run(&ctx, args),
            Commands::Create(args) => record::run_create(&ctx, args),
            Commands::Find(args) => record::run_find(&ctx, args),
            Commands::Set(args) => record::run_set(&ctx, args),
            Commands::Expire(args) => record::run_expire(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the key directory and an empty key file
    Init(init::InitArgs),
    /// List stored keys (never prints key material)
    List(list::ListArgs),
    /// Store a new API key
    Create(record::CreateArgs),
    /// Find key records by account and/or domain
    Find(record::FindArgs),
    /// Set, change, or clear optional fields on a stored key
    Set(record::SetArgs),
    /// Mark a stored key as expired
    Expire(record::ExpireArgs),
}
