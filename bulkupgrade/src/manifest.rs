//! CSV manifest loading and validation

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::errors::UpgradeError;
use crate::filesys::file::File;

/// Columns of an upgrade manifest. Order does not matter.
pub const UPGRADE_COLUMNS: [&str; 7] = [
    "serial_number",
    "software_version",
    "download_time",
    "upgrade_time",
    "interfaces",
    "download_interval",
    "upgrade_interval",
];

/// Column an abort manifest must contain
pub const ABORT_COLUMN: &str = "serial_number";

const BOM: char = '\u{feff}';

/// What a run does with its manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestMode {
    Upgrade,
    Abort,
}

/// One upgrade manifest record. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeRow {
    /// 1-based data row number
    pub row: usize,
    pub serial_number: Option<String>,
    pub software_version: Option<String>,
    pub download_time: Option<String>,
    pub upgrade_time: Option<String>,
    /// Comma-separated interface names
    pub interfaces: Option<String>,
    pub download_interval: Option<String>,
    pub upgrade_interval: Option<String>,
}

impl UpgradeRow {
    /// Interface names listed in the row, trimmed, empty segments dropped.
    /// `None` when the cell is blank.
    pub fn interface_names(&self) -> Option<Vec<&str>> {
        self.interfaces.as_deref().map(|cell| {
            cell.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
    }
}

/// One abort manifest record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbortRow {
    /// 1-based data row number
    pub row: usize,
    pub serial_number: Option<String>,
}

/// A loaded and validated manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    Upgrade(Vec<UpgradeRow>),
    Abort(Vec<AbortRow>),
}

impl Manifest {
    pub fn len(&self) -> usize {
        match self {
            Manifest::Upgrade(rows) => rows.len(),
            Manifest::Abort(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load the manifest at `path` and validate its columns for `mode`
pub async fn load(path: &Path, mode: ManifestMode) -> Result<Manifest, UpgradeError> {
    let file = File::new(path);
    if !file.exists().await {
        return Err(UpgradeError::FileNotFound(path.to_path_buf()));
    }

    let contents = file.read_string().await?;
    let manifest = parse(&contents, mode)?;
    info!("Loaded {} rows from {}", manifest.len(), path.display());
    Ok(manifest)
}

/// Parse manifest text and validate its columns for `mode`
pub fn parse(contents: &str, mode: ManifestMode) -> Result<Manifest, UpgradeError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();
    debug!("Manifest header: {:?}", headers);
    validate_columns(&headers, mode)?;

    let columns = Columns::new(&headers);
    let mut records = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Whitespace-only lines; a row of empty cells is still a row
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        records.push((i + 1, record));
    }

    let manifest = match mode {
        ManifestMode::Upgrade => Manifest::Upgrade(
            records
                .iter()
                .map(|(row, record)| UpgradeRow {
                    row: *row,
                    serial_number: columns.cell(record, "serial_number"),
                    software_version: columns.cell(record, "software_version"),
                    download_time: columns.cell(record, "download_time"),
                    upgrade_time: columns.cell(record, "upgrade_time"),
                    interfaces: columns.cell(record, "interfaces"),
                    download_interval: columns.cell(record, "download_interval"),
                    upgrade_interval: columns.cell(record, "upgrade_interval"),
                })
                .collect(),
        ),
        ManifestMode::Abort => Manifest::Abort(
            records
                .iter()
                .map(|(row, record)| AbortRow {
                    row: *row,
                    serial_number: columns.cell(record, ABORT_COLUMN),
                })
                .collect(),
        ),
    };
    Ok(manifest)
}

/// Upgrade manifests need exactly the upgrade column set; abort manifests
/// need at least a serial number column.
fn validate_columns(headers: &[String], mode: ManifestMode) -> Result<(), UpgradeError> {
    let valid = match mode {
        ManifestMode::Upgrade => {
            let found: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
            let expected: BTreeSet<&str> = UPGRADE_COLUMNS.into_iter().collect();
            found == expected
        }
        ManifestMode::Abort => headers.iter().any(|h| h == ABORT_COLUMN),
    };
    if valid {
        return Ok(());
    }

    let expected = match mode {
        ManifestMode::Upgrade => UPGRADE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        ManifestMode::Abort => vec![ABORT_COLUMN.to_string()],
    };
    Err(UpgradeError::SchemaError {
        found: headers.to_vec(),
        expected,
    })
}

/// Column name to record position
struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            positions.entry(header.clone()).or_insert(i);
        }
        Self { positions }
    }

    /// Cell value, `None` for a blank or missing cell
    fn cell(&self, record: &StringRecord, column: &str) -> Option<String> {
        let position = *self.positions.get(column)?;
        record
            .get(position)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
