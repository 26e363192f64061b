//! hembudget-storage-json
//!
//! Filesystem JSON persistence for per-user ledgers, their backups, and
//! data files written by earlier versions of the budgeting form.

pub mod legacy;

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use hembudget_core::{
    storage::{ensure_schema_support, normalize_ledger, LedgerBackupInfo, LedgerStorage, LoadReport},
    CoreError, SummaryService,
};
use hembudget_domain::{CategoryTemplate, Ledger, Month};
use serde_json::Value;

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;
const BUDGET_FIELDS: &[&str] = &["budget", "Budget"];
const ACTUAL_FIELDS: &[&str] = &["actual", "Faktiskt", "Actual"];

/// Directories the backend writes to.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// Standard layout below a data root: `ledgers/` and `backups/`.
    pub fn under(root: &Path) -> Self {
        Self {
            ledger_root: root.join("ledgers"),
            backup_root: root.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Clone)]
pub struct JsonLedgerStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    legacy_template: CategoryTemplate,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            ledgers_dir: paths.ledger_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
            legacy_template: CategoryTemplate::household(),
        })
    }

    /// Template given to ledgers imported from legacy data files; also used to
    /// split their composite `month_category_item` keys.
    pub fn with_legacy_template(mut self, template: CategoryTemplate) -> Self {
        self.legacy_template = template;
        self
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.slug_path(&canonical_name(name))
    }

    /// Summaries of every stored ledger, sorted by owner. Files that cannot
    /// be read are left out and reported in [`LedgerCatalog::skipped`].
    pub fn list_ledger_metadata(&self) -> Result<LedgerCatalog, CoreError> {
        let mut catalog = LedgerCatalog::default();
        for slug in self.list_ledgers()? {
            let path = self.slug_path(&slug);
            let report =
                match load_ledger_from_path(&path, &owner_from_slug(&slug), &self.legacy_template) {
                    Ok(report) => report,
                    Err(err) => {
                        catalog
                            .skipped
                            .push(format!("{}: {err}", path.display()));
                        continue;
                    }
                };
            let ledger = report.ledger;
            let remaining_total = SummaryService::year_totals(&ledger)
                .iter()
                .map(|(_, totals)| totals.remaining)
                .sum();
            catalog.entries.push(LedgerMetadata {
                slug,
                owner: ledger.owner.clone(),
                path: report.path,
                created_at: ledger.created_at,
                updated_at: ledger.updated_at,
                months: ledger.months.keys().copied().collect(),
                row_count: SummaryService::rows(&ledger).count(),
                remaining_total,
            });
        }
        catalog.entries.sort_by(|a, b| a.owner.cmp(&b.owner));
        Ok(catalog)
    }

    fn slug_path(&self, slug: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", slug, LEDGER_EXTENSION))
    }

    fn backup_dir(&self, slug: &str) -> PathBuf {
        self.backups_dir.join(slug)
    }

    /// Names the next backup. Backups taken within the same second get a
    /// `-<n>` counter after the time so they neither collide nor tie.
    fn next_backup_path(
        &self,
        slug: &str,
        note: Option<&str>,
    ) -> Result<(String, String, PathBuf), CoreError> {
        let dir = self.backup_dir(slug);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let counter = self
            .backups_for_slug(slug)?
            .iter()
            .filter_map(|info| parse_backup_timestamp(&info.id))
            .filter(|(stamp, _)| stamp.format(BACKUP_TIMESTAMP_FORMAT).to_string() == timestamp)
            .map(|(_, counter)| counter + 1)
            .max()
            .unwrap_or(1);
        let stamp = if counter == 1 {
            timestamp.clone()
        } else {
            format!("{timestamp}-{counter}")
        };
        let label = sanitize_backup_note(note)
            .map(|label| format!("_{label}"))
            .unwrap_or_default();
        let file_name = format!("{slug}_{stamp}{label}.{LEDGER_EXTENSION}");
        let path = dir.join(&file_name);
        Ok((file_name, timestamp, path))
    }

    fn write_backup_file(
        &self,
        ledger: &Ledger,
        slug: &str,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        let (file_name, timestamp, path) = self.next_backup_path(slug, note)?;
        write_atomic(&path, &serialize_ledger(ledger)?)?;
        self.prune_backups(slug)?;
        Ok(LedgerBackupInfo {
            ledger: slug.to_string(),
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn backup_existing_file(&self, slug: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let (_, _, backup) = self.next_backup_path(slug, None)?;
        fs::copy(path, backup)?;
        self.prune_backups(slug)?;
        Ok(())
    }

    fn backups_for_slug(&self, slug: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(slug);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let created_at = parse_backup_timestamp(file_name)
                    .map(|(stamp, _)| stamp.format(BACKUP_TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default();
                entries.push(LedgerBackupInfo {
                    ledger: slug.to_string(),
                    id: file_name.to_string(),
                    created_at,
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(parse_backup_timestamp(&info.id)));
        Ok(entries)
    }

    fn prune_backups(&self, slug: &str) -> Result<(), CoreError> {
        let entries = self.backups_for_slug(slug)?;
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        let slug = canonical_name(name);
        let path = self.slug_path(&slug);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.backup_existing_file(&slug, &path)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &serialize_ledger(ledger)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Option<LoadReport>, CoreError> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&path, name, &self.legacy_template).map(Some)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        if !self.ledgers_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        self.write_backup_file(ledger, &canonical_name(name), note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        self.backups_for_slug(&canonical_name(name))
    }

    /// The file being replaced is backed up first, so a restore can itself be undone.
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<LoadReport, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let data = fs::read_to_string(&backup.path)?;
        let report = parse_ledger(
            &data,
            &backup.path,
            &owner_from_slug(&backup.ledger),
            &self.legacy_template,
        )?;
        let target = self.slug_path(&backup.ledger);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        // pruning may remove the backup file itself; its contents are already in `data`
        self.backup_existing_file(&backup.ledger, &target)?;
        let tmp = tmp_path(&target);
        write_atomic(&tmp, &data)?;
        fs::rename(&tmp, &target)?;
        Ok(LoadReport {
            path: target,
            ..report
        })
    }
}

/// Loads a ledger from the provided filesystem path, importing legacy data files.
/// `owner` and `template` are only used for legacy files, which carry neither.
pub fn load_ledger_from_path(
    path: &Path,
    owner: &str,
    template: &CategoryTemplate,
) -> Result<LoadReport, CoreError> {
    let data = fs::read_to_string(path)?;
    parse_ledger(&data, path, owner, template)
}

fn parse_ledger(
    data: &str,
    path: &Path,
    owner: &str,
    template: &CategoryTemplate,
) -> Result<LoadReport, CoreError> {
    let value: Value =
        serde_json::from_str(data).map_err(|err| CoreError::Serde(err.to_string()))?;
    let (mut ledger, mut warnings, migrations) = if legacy::is_current_format(&value) {
        let warnings = coerced_amounts(&value);
        let ledger: Ledger =
            serde_json::from_value(value).map_err(|err| CoreError::Serde(err.to_string()))?;
        ensure_schema_support(&ledger)?;
        (ledger, warnings, Vec::new())
    } else {
        let import = legacy::import(&value, owner, template)?;
        (import.ledger, import.warnings, vec![import.migration])
    };
    warnings.extend(normalize_ledger(&mut ledger));
    Ok(LoadReport {
        ledger,
        warnings,
        migrations,
        path: path.to_path_buf(),
    })
}

/// Describes every stored amount the lenient reader will replace with `0.0`.
fn coerced_amounts(value: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(months) = value.get("months").and_then(Value::as_object) else {
        return warnings;
    };
    for (month, record) in months {
        let categories = record.get("categories").and_then(Value::as_array);
        for category in categories.into_iter().flatten() {
            let heading = category.get("name").and_then(Value::as_str).unwrap_or("?");
            let items = category.get("items").and_then(Value::as_array);
            for item in items.into_iter().flatten() {
                let name = item.get("name").and_then(Value::as_str).unwrap_or("?");
                for fields in [BUDGET_FIELDS, ACTUAL_FIELDS] {
                    let Some((field, raw)) = fields
                        .iter()
                        .find_map(|field| item.get(*field).map(|raw| (*field, raw)))
                    else {
                        continue;
                    };
                    if legacy::read_amount(raw).is_none() {
                        warnings.push(format!(
                            "{month}/{heading}/{name}: {field} `{raw}` coerced to 0"
                        ));
                    }
                }
            }
        }
    }
    warnings
}

/// Result of [`JsonLedgerStorage::list_ledger_metadata`].
#[derive(Debug, Clone, Default)]
pub struct LedgerCatalog {
    pub entries: Vec<LedgerMetadata>,
    /// One line per ledger file that could not be read.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LedgerMetadata {
    pub slug: String,
    pub owner: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub months: Vec<Month>,
    pub row_count: usize,
    pub remaining_total: f64,
}

/// File-system slug for a ledger owner.
///
/// Names are trimmed and lowercased. Letters and digits are kept; any other
/// character is written as `_xx` per UTF-8 byte, so two names share a slug
/// only when they differ in case or surrounding whitespace.
pub fn canonical_name(name: &str) -> String {
    let mut slug = String::new();
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                slug.push_str(&format!("_{byte:02x}"));
            }
        }
    }
    if slug.is_empty() {
        slug.push('_');
    }
    slug
}

/// Reverses [`canonical_name`] up to case; used as the owner of legacy files.
fn owner_from_slug(slug: &str) -> String {
    let mut bytes = Vec::with_capacity(slug.len());
    let mut rest = slug;
    while let Some(ch) = rest.chars().next() {
        if ch == '_' {
            if let Some(byte) = rest
                .get(1..3)
                .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                bytes.push(byte);
                rest = &rest[3..];
                continue;
            }
        }
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        rest = &rest[ch.len_utf8()..];
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Timestamp and same-second counter of a backup file name, newest sorting last.
fn parse_backup_timestamp(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", LEDGER_EXTENSION))?;
    let segments = trimmed.split('_').collect::<Vec<_>>();
    // `<slug>_<date>_<time>[-<n>][_<note>]`; the slug itself may contain underscores.
    segments.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        let (clock, counter) = match time.split_once('-') {
            Some((clock, counter)) if is_digits(counter, counter.len()) => {
                (clock, counter.parse::<u32>().ok()?)
            }
            Some(_) => return None,
            None => (time, 1),
        };
        if !is_digits(date, 8) {
            return None;
        }
        // minute-resolution names come from older versions
        let format = if is_digits(clock, 6) {
            "%Y%m%d%H%M%S"
        } else if is_digits(clock, 4) {
            "%Y%m%d%H%M"
        } else {
            return None;
        };
        NaiveDateTime::parse_from_str(&format!("{}{}", date, clock), format)
            .ok()
            .map(|naive| (DateTime::from_naive_utc_and_offset(naive, Utc), counter))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    !value.is_empty() && value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_ledger(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}
