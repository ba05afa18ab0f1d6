use crate::cli::CliContext;
use crate::core::store::{KeyStore, StoreStatus};
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by account
    #[arg(long)]
    pub account: Option<String>,

    /// Filter by domain (normalized before lookup)
    #[arg(long)]
    pub domain: Option<String>,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

pub fn run(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }

    let store = KeyStore::open(ctx.paths.clone())?;
    if store.status() == StoreStatus::NoStore {
        println!(
            "no key file at {} — run 'apikey-vault init' or store a key with 'create'",
            store.keyfile().display()
        );
        return Ok(());
    }

    let entries = store.list(args.account.as_deref(), args.domain.as_deref());

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&entries).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No keys found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Active").add_attribute(Attribute::Bold),
        Cell::new("Account").add_attribute(Attribute::Bold),
        Cell::new("Domain").add_attribute(Attribute::Bold),
        Cell::new("Description").add_attribute(Attribute::Bold),
    ]);
    for entry in entries {
        table.add_row(vec![
            if entry.expired { "no" } else { "yes" }.to_string(),
            entry.account,
            entry.domain,
            entry.description,
        ]);
    }
    println!("{}", table);
    Ok(())
}
