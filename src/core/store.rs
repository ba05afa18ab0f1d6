//! The dual-index key record store.
//!
//! All records live in one arena; the by-account and by-domain indices
//! hold ids into it, so both indices always reference the same record
//! instances and a mutation through either path is visible through the
//! other. Every mutating operation validates its input, updates the
//! indices, marks the store dirty, and flushes the whole collection to
//! the key file before returning. The index maps preserve insertion
//! order; the key file layout and the domain-only lookup depend on it.

use crate::core::domain::canonical_domain;
use crate::core::keyfile;
use crate::core::paths::KeyfilePaths;
use crate::error::{Result, StoreError};
use crate::models::record::{now, ListEntry, Record, RecordPatch};
use indexmap::IndexMap;
use std::path::PathBuf;

/// account → domain → record ids, or domain → account → record ids.
type PairIndex = IndexMap<String, IndexMap<String, Vec<usize>>>;

/// Load outcome reported by [`KeyStore::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The key file was read and indexed.
    Loaded,
    /// No key file exists yet; the store starts empty.
    NoStore,
}

pub struct KeyStore {
    paths: KeyfilePaths,
    records: Vec<Record>,
    by_account: PairIndex,
    by_domain: PairIndex,
    dirty: bool,
    status: StoreStatus,
}

impl KeyStore {
    /// Open the store at the given location.
    ///
    /// A missing key file is the bootstrap case and yields an empty
    /// store with [`StoreStatus::NoStore`]; an unreadable or undecodable
    /// file aborts construction.
    pub fn open(paths: KeyfilePaths) -> Result<Self> {
        let mut store = Self {
            paths,
            records: Vec::new(),
            by_account: IndexMap::new(),
            by_domain: IndexMap::new(),
            dirty: false,
            status: StoreStatus::NoStore,
        };
        match store.load() {
            Ok(()) => store.status = StoreStatus::Loaded,
            Err(StoreError::KeyfileMissing { .. }) => store.status = StoreStatus::NoStore,
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    pub fn status(&self) -> StoreStatus {
        self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Full path of the backing key file.
    pub fn keyfile(&self) -> PathBuf {
        self.paths.keyfile()
    }

    /// Write an empty key file for a store that has none yet.
    pub fn init_keyfile(&mut self) -> Result<()> {
        self.dirty = true;
        self.flush()?;
        self.status = StoreStatus::Loaded;
        Ok(())
    }

    /// Re-read the key file, rebuilding both indices from scratch.
    /// Refuses to run while unflushed changes exist.
    pub fn reload(&mut self) -> Result<()> {
        self.load()?;
        self.status = StoreStatus::Loaded;
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        if self.dirty {
            return Err(StoreError::DirtyReload);
        }
        let records = keyfile::read_records(&self.paths.keyfile())?;
        self.records.clear();
        self.by_account.clear();
        self.by_domain.clear();
        let mut skipped = 0usize;
        for record in records {
            if record.key.is_empty() || record.account.is_empty() || record.domain.is_empty() {
                skipped += 1;
                continue;
            }
            self.insert(record);
        }
        if skipped > 0 {
            eprintln!(
                "warning: skipped {} record(s) in {} without a key, account, and domain",
                skipped,
                self.paths.keyfile().display()
            );
        }
        Ok(())
    }

    /// Create and submit a record in one step.
    ///
    /// When no description is given the record gets a default one naming
    /// the domain as the caller wrote it.
    pub fn create(
        &mut self,
        account: &str,
        domain: &str,
        key: &str,
        description: Option<&str>,
    ) -> Result<()> {
        validate_required(key, account, domain)?;
        let mut record = Record::new();
        record.account = account.to_string();
        record.domain = domain.to_string();
        record.key = key.to_string();
        record.description = match description {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("A key for the {} API", domain),
        };
        self.submit(record)
    }

    /// Insert a record into the store and write the key file.
    ///
    /// The domain is normalized in place. A record for an existing
    /// (account, domain) pair appends to that pair's sequence, so
    /// multiple keys per pair are kept in insertion order.
    pub fn submit(&mut self, record: Record) -> Result<()> {
        validate_required(&record.key, &record.account, &record.domain)?;
        let id = self.insert(record);
        self.dirty = true;
        self.records[id].updated_at = Some(now());
        self.flush()
    }

    /// Index one record under its (account, canonical domain) pair.
    /// By-account insertion happens before by-domain insertion.
    fn insert(&mut self, mut record: Record) -> usize {
        record.domain = canonical_domain(&record.domain);
        let account = record.account.clone();
        let domain = record.domain.clone();
        let id = self.records.len();
        self.records.push(record);
        self.by_account
            .entry(account.clone())
            .or_default()
            .entry(domain.clone())
            .or_default()
            .push(id);
        self.by_domain
            .entry(domain)
            .or_default()
            .entry(account)
            .or_default()
            .push(id);
        id
    }

    /// Find records by account and/or domain, returning copies.
    ///
    /// With an account, a given domain must match exactly after
    /// normalization, and no domain means all of the account's records.
    /// An unknown account falls through to the domain index. With only a
    /// domain, the result is the first indexed account's sequence for
    /// that domain, not the union across accounts. With neither, the
    /// result is empty. `include_expired = false` filters expired
    /// records out.
    pub fn find(
        &self,
        account: Option<&str>,
        domain: Option<&str>,
        include_expired: bool,
    ) -> Vec<Record> {
        self.find_ids(account, domain, include_expired)
            .into_iter()
            .map(|id| self.records[id].clone())
            .collect()
    }

    /// Resolve matching record ids. Empty strings count as absent.
    fn find_ids(
        &self,
        account: Option<&str>,
        domain: Option<&str>,
        include_expired: bool,
    ) -> Vec<usize> {
        let account = account.filter(|a| !a.is_empty());
        let domain = domain.filter(|d| !d.is_empty());

        if let Some(account) = account {
            if let Some(domains) = self.by_account.get(account) {
                return match domain {
                    Some(domain) => {
                        let canon = canonical_domain(domain);
                        domains
                            .get(&canon)
                            .map(|ids| self.filter_ids(ids, include_expired))
                            .unwrap_or_default()
                    }
                    None => {
                        let mut out = Vec::new();
                        for ids in domains.values() {
                            out.extend(self.filter_ids(ids, include_expired));
                        }
                        out
                    }
                };
            }
            // unknown account: fall through to the domain index
        }

        if let Some(domain) = domain {
            let canon = canonical_domain(domain);
            if let Some(accounts) = self.by_domain.get(&canon) {
                // first account's sequence only, in insertion order
                if let Some(ids) = accounts.values().next() {
                    return self.filter_ids(ids, include_expired);
                }
            }
        }

        Vec::new()
    }

    fn filter_ids(&self, ids: &[usize], include_expired: bool) -> Vec<usize> {
        ids.iter()
            .copied()
            .filter(|&id| include_expired || !self.records[id].expired)
            .collect()
    }

    /// Update the optional fields of the record matching the patch.
    ///
    /// The record is located by account and/or domain plus exact key
    /// equality, expired records included. Named optional fields absent
    /// from the patch are cleared, extension fields absent from the
    /// patch are removed, and protected fields (`key`, `account`,
    /// `domain`, timestamps, `expired`) are never taken from the patch.
    /// Returns `Ok(false)` when no record matches.
    pub fn update(&mut self, patch: &RecordPatch) -> Result<bool> {
        let id = match self.match_patch(patch)? {
            Some(id) => id,
            None => return Ok(false),
        };
        let record = &mut self.records[id];
        record.organization = patch.organization.clone().unwrap_or_default();
        record.mnemonic = patch.mnemonic.clone().unwrap_or_default();
        record.description = patch.description.clone().unwrap_or_default();
        record.extra = patch.extra.clone();
        record.updated_at = Some(now());
        self.dirty = true;
        self.flush()?;
        Ok(true)
    }

    /// Mark the record matching the patch as expired.
    ///
    /// Expiring an already-expired record succeeds and changes nothing
    /// beyond the update timestamp.
    pub fn expire(&mut self, patch: &RecordPatch) -> Result<bool> {
        let id = match self.match_patch(patch)? {
            Some(id) => id,
            None => return Ok(false),
        };
        let record = &mut self.records[id];
        record.expired = true;
        record.updated_at = Some(now());
        self.dirty = true;
        self.flush()?;
        Ok(true)
    }

    /// Shared candidate selection for update/expire: validate the patch,
    /// then pick the first candidate whose key matches exactly.
    fn match_patch(&self, patch: &RecordPatch) -> Result<Option<usize>> {
        let domain = canonical_domain(&patch.domain);
        if patch.account.is_empty() && domain.is_empty() {
            return Err(StoreError::MissingField("account or domain"));
        }
        if patch.key.is_empty() {
            return Err(StoreError::MissingField("key"));
        }
        let ids = self.find_ids(Some(patch.account.as_str()), Some(domain.as_str()), true);
        Ok(ids.into_iter().find(|&id| self.records[id].key == patch.key))
    }

    /// Project records for display, expired records always included.
    ///
    /// Filters resolve like [`KeyStore::find`]; with no filters at all,
    /// every record is listed in by-account insertion order. Duplicate
    /// keys for a pair all appear; nothing is de-duplicated.
    pub fn list(&self, account: Option<&str>, domain: Option<&str>) -> Vec<ListEntry> {
        let account = account.filter(|a| !a.is_empty());
        let domain = domain.filter(|d| !d.is_empty());
        let ids = if account.is_some() || domain.is_some() {
            self.find_ids(account, domain, true)
        } else {
            self.by_account
                .values()
                .flat_map(|domains| domains.values())
                .flatten()
                .copied()
                .collect()
        };
        ids.into_iter()
            .map(|id| ListEntry::from_record(&self.records[id]))
            .collect()
    }

    /// Write the whole record collection out if anything changed.
    ///
    /// Records are flattened from the by-domain index, so the file
    /// groups keys by domain, then account, in insertion order. Dirty
    /// stays set when the write fails so a later call can re-flush.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let ordered: Vec<&Record> = self
            .by_domain
            .values()
            .flat_map(|accounts| accounts.values())
            .flatten()
            .map(|&id| &self.records[id])
            .collect();
        keyfile::write_records(&self.paths.keyfile(), &ordered)?;
        self.dirty = false;
        Ok(())
    }
}

fn validate_required(key: &str, account: &str, domain: &str) -> Result<()> {
    if account.is_empty() {
        return Err(StoreError::MissingField("account"));
    }
    if domain.is_empty() {
        return Err(StoreError::MissingField("domain"));
    }
    if key.is_empty() {
        return Err(StoreError::MissingField("key"));
    }
    Ok(())
}
