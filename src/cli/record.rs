use crate::cli::CliContext;
use crate::constants;
use crate::core::domain::canonical_domain;
use crate::core::store::{KeyStore, StoreStatus};
use crate::models::record::RecordPatch;
use crate::util::fingerprint::fingerprint;
use crate::util::fs as key_fs;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use dialoguer::Password;
use serde_json::Value;
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Account the key belongs to
    pub account: String,

    /// Domain or URL of the API the key unlocks
    pub domain: String,

    /// Description stored with the key
    #[arg(long)]
    pub description: Option<String>,

    /// Read the key from stdin instead of an interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Account to search for
    #[arg(long)]
    pub account: Option<String>,

    /// Domain to search for (normalized before lookup)
    #[arg(long)]
    pub domain: Option<String>,

    /// Include expired keys
    #[arg(long)]
    pub include_expired: bool,

    /// Print full key values instead of fingerprints
    #[arg(long)]
    pub reveal: bool,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Account of the record to modify
    #[arg(long)]
    pub account: Option<String>,

    /// Domain of the record to modify
    #[arg(long)]
    pub domain: Option<String>,

    /// FIELD=VALUE pairs to set; a bare FIELD clears it
    #[arg(value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,

    /// Remove a field instead of setting it
    #[arg(long, value_name = "FIELD")]
    pub unset: Vec<String>,

    /// Read the key from stdin instead of an interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct ExpireArgs {
    /// Account of the record to expire
    #[arg(long)]
    pub account: Option<String>,

    /// Domain of the record to expire
    #[arg(long)]
    pub domain: Option<String>,

    /// Read the key from stdin instead of an interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

pub fn run_create(ctx: &CliContext, args: CreateArgs) -> Result<()> {
    key_fs::ensure_private_dir(&ctx.paths.dir, constants::KEY_DIR_MODE)?;
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for create");
    }
    let key = read_key(args.from_stdin, &args.account, &args.domain)?;

    let mut store = KeyStore::open(ctx.paths.clone())?;
    store.create(&args.account, &args.domain, key.as_str(), args.description.as_deref())?;
    println!(
        "Stored a key for {} at {}",
        args.account,
        canonical_domain(&args.domain)
    );
    Ok(())
}

pub fn run_find(ctx: &CliContext, args: FindArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    if args.account.is_none() && args.domain.is_none() {
        bail!("pass --account and/or --domain to find keys");
    }

    let store = KeyStore::open(ctx.paths.clone())?;
    if store.status() == StoreStatus::NoStore {
        println!(
            "no key file at {} — run 'apikey-vault init' or store a key with 'create'",
            store.keyfile().display()
        );
        return Ok(());
    }

    let records = store.find(
        args.account.as_deref(),
        args.domain.as_deref(),
        args.include_expired,
    );
    if records.is_empty() {
        println!(
            "No records were found for {}",
            describe_target(
                args.account.as_deref().unwrap_or(""),
                args.domain.as_deref().unwrap_or("")
            )
        );
        return Ok(());
    }

    if args.format == "json" {
        let mut items = Vec::new();
        for record in &records {
            let mut value = serde_json::to_value(record).context("serialize record")?;
            if !args.reveal {
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("key".to_string(), Value::String(fingerprint(&record.key)));
                }
            }
            items.push(value);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("serialize records")?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Active").add_attribute(Attribute::Bold),
        Cell::new("Account").add_attribute(Attribute::Bold),
        Cell::new("Domain").add_attribute(Attribute::Bold),
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Description").add_attribute(Attribute::Bold),
        Cell::new("Updated").add_attribute(Attribute::Bold),
    ]);
    for record in &records {
        let key_cell = if args.reveal {
            record.key.clone()
        } else {
            fingerprint(&record.key)
        };
        let updated = record
            .updated_at
            .map(|ts| ts.format(constants::TS_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            if record.expired { "no" } else { "yes" }.to_string(),
            record.account.clone(),
            record.domain.clone(),
            key_cell,
            record.description.clone(),
            updated,
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn run_set(ctx: &CliContext, args: SetArgs) -> Result<()> {
    if args.account.is_none() && args.domain.is_none() {
        bail!("pass --account and/or --domain to address the record");
    }
    if args.fields.is_empty() && args.unset.is_empty() {
        bail!("nothing to do: pass FIELD=VALUE pairs or --unset FIELD");
    }
    let assignments = parse_assignments(&args.fields)?;
    for field in &args.unset {
        reject_protected(field)?;
    }
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for set");
    }

    let account = args.account.clone().unwrap_or_default();
    let domain = args.domain.clone().unwrap_or_default();
    let key = read_key(args.from_stdin, &account, &domain)?;

    let mut store = KeyStore::open(ctx.paths.clone())?;
    let matched = store
        .find(Some(account.as_str()), Some(domain.as_str()), true)
        .into_iter()
        .find(|r| r.key == *key);
    let mut patch = match matched {
        Some(ref record) => RecordPatch::from_record(record),
        None => {
            println!(
                "No stored key matched {} with the given key",
                describe_target(&account, &domain)
            );
            return Ok(());
        }
    };
    for (field, value) in &assignments {
        apply_assignment(&mut patch, field, value);
    }
    for field in &args.unset {
        clear_field(&mut patch, field);
    }

    if store.update(&patch)? {
        println!(
            "Updated the key record for {} at {}",
            patch.account, patch.domain
        );
    } else {
        println!(
            "No stored key matched {} with the given key",
            describe_target(&account, &domain)
        );
    }
    Ok(())
}

pub fn run_expire(ctx: &CliContext, args: ExpireArgs) -> Result<()> {
    if args.account.is_none() && args.domain.is_none() {
        bail!("pass --account and/or --domain to address the record");
    }
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for expire");
    }

    let account = args.account.clone().unwrap_or_default();
    let domain = args.domain.clone().unwrap_or_default();
    let key = read_key(args.from_stdin, &account, &domain)?;

    let mut store = KeyStore::open(ctx.paths.clone())?;
    let patch = RecordPatch {
        key: (*key).clone(),
        account: account.clone(),
        domain: domain.clone(),
        ..RecordPatch::default()
    };
    if store.expire(&patch)? {
        println!("Expired the key for {}", describe_target(&account, &domain));
    } else {
        println!(
            "No stored key matched {} with the given key",
            describe_target(&account, &domain)
        );
    }
    Ok(())
}

fn read_key(from_stdin: bool, account: &str, domain: &str) -> Result<Zeroizing<String>> {
    let key = if from_stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read key from stdin")?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        Zeroizing::new(
            Password::new()
                .with_prompt(format!("API key for {}", describe_target(account, domain)))
                .allow_empty_password(false)
                .interact()
                .context("read key from prompt")?,
        )
    };
    if key.len() > constants::MAX_KEY_SIZE {
        bail!(
            "key exceeds maximum size ({} bytes, max {} bytes)",
            key.len(),
            constants::MAX_KEY_SIZE
        );
    }
    Ok(key)
}

fn describe_target(account: &str, domain: &str) -> String {
    match (account.is_empty(), domain.is_empty()) {
        (false, false) => format!("{} at {}", account, domain),
        (false, true) => account.to_string(),
        (true, false) => domain.to_string(),
        (true, true) => "the record".to_string(),
    }
}

/// Parse `FIELD=VALUE` arguments; a bare `FIELD` means an empty value.
fn parse_assignments(fields: &[String]) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for raw in fields {
        let (field, value) = match raw.split_once('=') {
            Some((field, value)) => (field.trim().to_string(), value.trim().to_string()),
            None => (raw.trim().to_string(), String::new()),
        };
        if field.is_empty() {
            bail!("cannot parse '{}' as FIELD=VALUE", raw);
        }
        reject_protected(&field)?;
        out.push((field, value));
    }
    Ok(out)
}

fn reject_protected(field: &str) -> Result<()> {
    if constants::PROTECTED_FIELDS.contains(&field) {
        bail!(
            "the '{}' field is managed by the store and cannot be set",
            field
        );
    }
    Ok(())
}

/// Write one assignment into the patch. An empty value clears a named
/// optional field and removes an extension field, as the store's update
/// removal rule expects.
fn apply_assignment(patch: &mut RecordPatch, field: &str, value: &str) {
    let value_opt = if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    };
    match field {
        "organization" => patch.organization = value_opt,
        "mnemonic" => patch.mnemonic = value_opt,
        "description" => patch.description = value_opt,
        _ => {
            if value.is_empty() {
                patch.extra.remove(field);
            } else {
                patch
                    .extra
                    .insert(field.to_string(), Value::String(value.to_string()));
            }
        }
    }
}

fn clear_field(patch: &mut RecordPatch, field: &str) {
    match field {
        "organization" => patch.organization = None,
        "mnemonic" => patch.mnemonic = None,
        "description" => patch.description = None,
        _ => {
            patch.extra.remove(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments_pairs() {
        let fields = vec!["organization=Acme Corp".to_string(), "region=eu".to_string()];
        let parsed = parse_assignments(&fields).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("organization".to_string(), "Acme Corp".to_string()),
                ("region".to_string(), "eu".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_assignments_bare_field_clears() {
        let fields = vec!["mnemonic".to_string()];
        let parsed = parse_assignments(&fields).unwrap();
        assert_eq!(parsed, vec![("mnemonic".to_string(), String::new())]);
    }

    #[test]
    fn test_parse_assignments_rejects_empty_field() {
        assert!(parse_assignments(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_parse_assignments_rejects_protected_fields() {
        for field in constants::PROTECTED_FIELDS {
            let arg = format!("{}=x", field);
            assert!(parse_assignments(&[arg]).is_err(), "{} not rejected", field);
        }
    }

    #[test]
    fn test_apply_assignment_named_and_extension_fields() {
        let mut patch = RecordPatch::default();
        apply_assignment(&mut patch, "organization", "Acme");
        apply_assignment(&mut patch, "region", "eu-west-1");
        assert_eq!(patch.organization.as_deref(), Some("Acme"));
        assert_eq!(patch.extra["region"], "eu-west-1");

        apply_assignment(&mut patch, "organization", "");
        apply_assignment(&mut patch, "region", "");
        assert!(patch.organization.is_none());
        assert!(!patch.extra.contains_key("region"));
    }

    #[test]
    fn test_clear_field() {
        let mut patch = RecordPatch::default();
        patch.description = Some("old".into());
        patch.extra.insert("region".into(), Value::String("eu".into()));
        clear_field(&mut patch, "description");
        clear_field(&mut patch, "region");
        assert!(patch.description.is_none());
        assert!(patch.extra.is_empty());
    }

    #[test]
    fn test_describe_target() {
        assert_eq!(describe_target("alice", "a.io"), "alice at a.io");
        assert_eq!(describe_target("alice", ""), "alice");
        assert_eq!(describe_target("", "a.io"), "a.io");
        assert_eq!(describe_target("", ""), "the record");
    }
}
