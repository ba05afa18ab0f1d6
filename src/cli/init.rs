use crate::cli::CliContext;
use crate::constants;
use crate::core::store::{KeyStore, StoreStatus};
use crate::util::fs as key_fs;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run(ctx: &CliContext, _args: InitArgs) -> Result<()> {
    key_fs::ensure_private_dir(&ctx.paths.dir, constants::KEY_DIR_MODE)?;
    let mut store = KeyStore::open(ctx.paths.clone())?;
    match store.status() {
        StoreStatus::Loaded => {
            println!("key file already present at {}", store.keyfile().display());
        }
        StoreStatus::NoStore => {
            store.init_keyfile()?;
            println!("initialized empty key file at {}", store.keyfile().display());
        }
    }
    Ok(())
}
