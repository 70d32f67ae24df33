// ==========================================
// Tecnova POS - inventory import domain model
// ==========================================
// Purpose: typed rows, row errors and the run summary
//          produced by the CSV bulk-import pipeline
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ProductStatus - Activo / Inactivo
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    Activo,
    Inactivo,
}

impl ProductStatus {
    /// Parses the exact enum spelling; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Activo" => Some(ProductStatus::Activo),
            "Inactivo" => Some(ProductStatus::Inactivo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Activo => "Activo",
            ProductStatus::Inactivo => "Inactivo",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ProductStatus::Activo)
    }
}

// ==========================================
// CandidateRow - validated import entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub status: ProductStatus,
}

impl CandidateRow {
    pub fn active(&self) -> bool {
        self.status.is_active()
    }
}

/// A candidate tagged with its 1-based data-row number.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedRow {
    pub row: usize,
    pub data: CandidateRow,
}

// ==========================================
// RowError - per-row failure
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowErrorCode {
    BadFormat,
    Required,
    OutOfRange,
    DupInFile,
    DupInDb,
    UpsertFail,
}

impl fmt::Display for RowErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowErrorCode::BadFormat => "BAD_FORMAT",
            RowErrorCode::Required => "REQUIRED",
            RowErrorCode::OutOfRange => "OUT_OF_RANGE",
            RowErrorCode::DupInFile => "DUP_IN_FILE",
            RowErrorCode::DupInDb => "DUP_IN_DB",
            RowErrorCode::UpsertFail => "UPSERT_FAIL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row; 0 for run-level failures
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column: Option<String>,
    pub code: RowErrorCode,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, code: RowErrorCode, message: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            code,
            message: message.into(),
        }
    }

    pub fn on_column(
        row: usize,
        column: impl Into<String>,
        code: RowErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column: Some(column.into()),
            code,
            message: message.into(),
        }
    }
}

// ==========================================
// ImportMode / ImportOptions
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Insert,
    Upsert,
}

impl ImportMode {
    /// Lenient query-string parsing: only "upsert" selects upsert.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("upsert") => ImportMode::Upsert,
            _ => ImportMode::Insert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Insert => "insert",
            ImportMode::Upsert => "upsert",
        }
    }
}

/// Parses the `dryRun` flag: absent means `default`, otherwise only a
/// case-insensitive "true" enables dry-run.
pub fn parse_dry_run(raw: Option<&str>, default: bool) -> bool {
    match raw {
        None => default,
        Some(v) => v.eq_ignore_ascii_case("true"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub dry_run: bool,
    pub batch_size: usize,
    pub max_file_bytes: usize,
    /// Caller identity, used for the audit log line only
    pub requested_by: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Insert,
            dry_run: true,
            batch_size: DEFAULT_BATCH_SIZE,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            requested_by: None,
        }
    }
}

pub const DEFAULT_BATCH_SIZE: usize = 500;
/// Upper bound per batch. A lookup binds one name and at most one barcode per row,
/// which keeps it well under SQLite's 32766 bound-parameter limit.
pub const MAX_BATCH_SIZE: usize = 5000;
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

// ==========================================
// ImportSummary - run result
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub dry_run: bool,
    pub mode: ImportMode,
    pub duration_ms: u64,
}

impl ImportSummary {
    pub fn new(mode: ImportMode, dry_run: bool) -> Self {
        Self {
            total: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            dry_run,
            mode,
            duration_ms: 0,
        }
    }

    /// Records a row that will not be written, with its errors.
    pub fn skip_with(&mut self, errors: impl IntoIterator<Item = RowError>) {
        self.skipped += 1;
        self.errors.extend(errors);
    }

    /// `created + updated + skipped == total`
    pub fn is_reconciled(&self) -> bool {
        self.created + self.updated + self.skipped == self.total
    }

    pub fn count_by_code(&self, code: RowErrorCode) -> usize {
        self.errors.iter().filter(|e| e.code == code).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!(ProductStatus::parse("Activo"), Some(ProductStatus::Activo));
        assert_eq!(ProductStatus::parse("Inactivo"), Some(ProductStatus::Inactivo));
        assert_eq!(ProductStatus::parse("inactivo"), None);
        assert!(!ProductStatus::Inactivo.is_active());
        assert!(ProductStatus::Activo.is_active());
    }

    #[test]
    fn test_mode_and_dry_run_parsing() {
        assert_eq!(ImportMode::from_query(Some("upsert")), ImportMode::Upsert);
        assert_eq!(ImportMode::from_query(Some("UPSERT")), ImportMode::Insert);
        assert_eq!(ImportMode::from_query(None), ImportMode::Insert);

        assert!(parse_dry_run(None, true));
        assert!(parse_dry_run(Some("TRUE"), false));
        assert!(!parse_dry_run(Some("false"), true));
        assert!(!parse_dry_run(Some("1"), true));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let mut summary = ImportSummary::new(ImportMode::Upsert, false);
        summary.total = 1;
        summary.skip_with([RowError::on_column(
            1,
            "price",
            RowErrorCode::BadFormat,
            "price inválido",
        )]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["dryRun"], false);
        assert_eq!(json["mode"], "upsert");
        assert_eq!(json["durationMs"], 0);
        assert_eq!(json["errors"][0]["code"], "BAD_FORMAT");
        assert_eq!(json["errors"][0]["column"], "price");
        assert!(summary.is_reconciled());
    }

    #[test]
    fn test_row_error_omits_missing_column() {
        let err = RowError::new(0, RowErrorCode::UpsertFail, "boom");
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("column").is_none());
        assert_eq!(json["code"], "UPSERT_FAIL");
    }
}
