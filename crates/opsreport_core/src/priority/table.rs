//! Curated priority table and its JSON configuration format.
//!
//! # Responsibility
//! - Load the versioned category/content rank tables from configuration data.
//! - Answer rank lookups for arbitrary labels, known or not.
//! - Provide the deterministic display order used by every report.
//!
//! # Invariants
//! - Ranks are injective per table and strictly below [`SENTINEL_RANK`].
//! - Lookups never fail: unknown labels rank as [`SENTINEL_RANK`].
//! - Labels match after trimming and collapsing inner whitespace runs.

use crate::model::observation::Observation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Rank assigned to labels missing from the curated table.
pub const SENTINEL_RANK: u32 = 999;

const DEFAULT_TABLE_JSON: &str = include_str!("default_priority.json");

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

static DEFAULT_TABLE: Lazy<PriorityTable> = Lazy::new(|| {
    PriorityTable::from_json_str(DEFAULT_TABLE_JSON).expect("embedded priority table is valid")
});

/// Display-order key of one observation.
pub type SortKey = (u32, u32, i32, u32, u32);

/// Which of the two curated tables a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Category,
    Content,
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => f.write_str("category"),
            Self::Content => f.write_str("content"),
        }
    }
}

/// Priority table load/validation error.
#[derive(Debug)]
pub enum PriorityTableError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    EmptyVersion,
    DuplicateLabel { table: TableKind, label: String },
    DuplicateRank { table: TableKind, rank: u32 },
    RankOutOfRange { table: TableKind, label: String, rank: u32 },
}

impl Display for PriorityTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read priority table: {err}"),
            Self::Parse(err) => write!(f, "invalid priority table json: {err}"),
            Self::EmptyVersion => f.write_str("priority table version cannot be empty"),
            Self::DuplicateLabel { table, label } => {
                write!(f, "duplicate {table} label in priority table: `{label}`")
            }
            Self::DuplicateRank { table, rank } => {
                write!(f, "duplicate {table} rank in priority table: {rank}")
            }
            Self::RankOutOfRange { table, label, rank } => write!(
                f,
                "{table} label `{label}` has rank {rank}; ranks must be below {SENTINEL_RANK}"
            ),
        }
    }
}

impl Error for PriorityTableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PriorityTableError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PriorityTableError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// One curated (label, rank) pair as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityEntry {
    pub label: String,
    pub rank: u32,
}

#[derive(Debug, Deserialize)]
struct PriorityTableFile {
    version: String,
    categories: Vec<PriorityEntry>,
    contents: Vec<PriorityEntry>,
}

/// Immutable category/content rank tables.
#[derive(Debug, Clone)]
pub struct PriorityTable {
    version: String,
    category_rank: HashMap<String, u32>,
    content_rank: HashMap<String, u32>,
}

impl PriorityTable {
    /// Returns the process-wide table shipped with this crate.
    pub fn builtin() -> &'static PriorityTable {
        &DEFAULT_TABLE
    }

    /// Parses and validates a table from its JSON configuration form.
    pub fn from_json_str(json: &str) -> Result<Self, PriorityTableError> {
        let file: PriorityTableFile = serde_json::from_str(json)?;
        Self::from_entries(file.version, file.categories, file.contents)
    }

    /// Reads a JSON table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PriorityTableError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Builds a table from explicit entries.
    ///
    /// # Errors
    /// - `EmptyVersion` when `version` is blank.
    /// - `DuplicateLabel` / `DuplicateRank` when a table is not injective.
    /// - `RankOutOfRange` when a rank reaches [`SENTINEL_RANK`].
    pub fn from_entries(
        version: impl Into<String>,
        categories: Vec<PriorityEntry>,
        contents: Vec<PriorityEntry>,
    ) -> Result<Self, PriorityTableError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(PriorityTableError::EmptyVersion);
        }

        Ok(Self {
            version: version.trim().to_string(),
            category_rank: index_entries(TableKind::Category, categories)?,
            content_rank: index_entries(TableKind::Content, contents)?,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Curated rank of a category, or [`SENTINEL_RANK`].
    pub fn rank_category(&self, name: &str) -> u32 {
        lookup(&self.category_rank, name)
    }

    /// Curated rank of a content label, or [`SENTINEL_RANK`].
    pub fn rank_content(&self, name: &str) -> u32 {
        lookup(&self.content_rank, name)
    }

    /// `(category_rank, content_rank, year, month, week)`.
    pub fn sort_key(&self, observation: &Observation) -> SortKey {
        (
            self.rank_category(&observation.category),
            self.rank_content(&observation.content),
            observation.year,
            observation.month,
            observation.week,
        )
    }

    /// Total order over observations: [`Self::sort_key`], then labels.
    pub fn compare_observations(&self, left: &Observation, right: &Observation) -> Ordering {
        self.sort_key(left)
            .cmp(&self.sort_key(right))
            .then_with(|| left.category.cmp(&right.category))
            .then_with(|| left.content.cmp(&right.content))
    }

    /// Orders categories by rank, then by label.
    pub fn compare_categories(&self, left: &str, right: &str) -> Ordering {
        self.rank_category(left)
            .cmp(&self.rank_category(right))
            .then_with(|| left.cmp(right))
    }

    /// Orders content labels by rank, then by label.
    pub fn compare_contents(&self, left: &str, right: &str) -> Ordering {
        self.rank_content(left)
            .cmp(&self.rank_content(right))
            .then_with(|| left.cmp(right))
    }

    /// Distinct categories in display order.
    pub fn sorted_categories<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut sorted: Vec<&str> = labels.into_iter().collect();
        sorted.sort_by(|left, right| self.compare_categories(left, right));
        sorted.dedup();
        sorted
    }

    /// Distinct content labels in display order.
    pub fn sorted_contents<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let mut sorted: Vec<&str> = labels.into_iter().collect();
        sorted.sort_by(|left, right| self.compare_contents(left, right));
        sorted.dedup();
        sorted
    }

    /// Curated entries of one table in rank order.
    pub fn entries(&self, table: TableKind) -> Vec<PriorityEntry> {
        let source = match table {
            TableKind::Category => &self.category_rank,
            TableKind::Content => &self.content_rank,
        };
        let mut entries: Vec<PriorityEntry> = source
            .iter()
            .map(|(label, rank)| PriorityEntry {
                label: label.clone(),
                rank: *rank,
            })
            .collect();
        entries.sort_by_key(|entry| entry.rank);
        entries
    }
}

/// Canonical form used for table keys and lookups.
pub fn normalize_label(label: &str) -> String {
    WHITESPACE_RE.replace_all(label.trim(), " ").into_owned()
}

fn lookup(table: &HashMap<String, u32>, name: &str) -> u32 {
    if let Some(rank) = table.get(name) {
        return *rank;
    }
    table
        .get(normalize_label(name).as_str())
        .copied()
        .unwrap_or(SENTINEL_RANK)
}

fn index_entries(
    table: TableKind,
    entries: Vec<PriorityEntry>,
) -> Result<HashMap<String, u32>, PriorityTableError> {
    let mut by_label = HashMap::with_capacity(entries.len());
    let mut seen_ranks = HashSet::with_capacity(entries.len());

    for entry in entries {
        let label = normalize_label(&entry.label);
        if entry.rank >= SENTINEL_RANK {
            return Err(PriorityTableError::RankOutOfRange {
                table,
                label,
                rank: entry.rank,
            });
        }
        if !seen_ranks.insert(entry.rank) {
            return Err(PriorityTableError::DuplicateRank {
                table,
                rank: entry.rank,
            });
        }
        if by_label.insert(label.clone(), entry.rank).is_some() {
            return Err(PriorityTableError::DuplicateLabel { table, label });
        }
    }

    Ok(by_label)
}

#[cfg(test)]
mod tests {
    use super::{normalize_label, PriorityTable, SENTINEL_RANK};

    #[test]
    fn builtin_table_loads_and_is_versioned() {
        let table = PriorityTable::builtin();
        assert!(!table.version().is_empty());
        assert_eq!(table.rank_category("Văn bản đến"), 1);
        assert_eq!(table.rank_category("Bãi giữ xe"), 13);
    }

    #[test]
    fn repeated_content_label_keeps_last_rank() {
        assert_eq!(PriorityTable::builtin().rank_content("Doanh thu"), 69);
    }

    #[test]
    fn lookup_tolerates_whitespace_noise() {
        let table = PriorityTable::builtin();
        assert_eq!(table.rank_category("  Lễ tân "), 4);
        assert_eq!(
            table.rank_content("Nhỡ do không bắt máy (Nhánh 3-PKQT)"),
            table.rank_content("Nhỡ do không bắt máy  (Nhánh 3-PKQT)")
        );
        assert_ne!(
            table.rank_content("Nhỡ do không bắt máy (Nhánh 3-PKQT)"),
            SENTINEL_RANK
        );
    }

    #[test]
    fn normalize_collapses_inner_runs() {
        assert_eq!(normalize_label("  a \t b\n c "), "a b c");
    }
}
