// ==========================================
// Tecnova POS - header resolver
// ==========================================
// Responsibility: delimiter inference and column mapping
//                 from the first line of an upload
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;

const UTF8_BOM: &str = "\u{feff}";

// ==========================================
// ImportField - recognised columns
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    Name,
    Description,
    Barcode,
    Price,
    Stock,
    Status,
}

impl ImportField {
    pub const ALL: [ImportField; 6] = [
        ImportField::Name,
        ImportField::Description,
        ImportField::Barcode,
        ImportField::Price,
        ImportField::Stock,
        ImportField::Status,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            ImportField::Name => "name",
            ImportField::Description => "description",
            ImportField::Barcode => "barcode",
            ImportField::Price => "price",
            ImportField::Stock => "stock",
            ImportField::Status => "status",
        }
    }

    /// Fixed position used by headerless resolution.
    pub fn position(&self) -> usize {
        match self {
            ImportField::Name => 0,
            ImportField::Description => 1,
            ImportField::Barcode => 2,
            ImportField::Price => 3,
            ImportField::Stock => 4,
            ImportField::Status => 5,
        }
    }
}

// ==========================================
// ColumnMap - field resolution strategy
// ==========================================
/// Maps lowercased column names to record positions.
///
/// Named lookup is used whenever the header produced at least one
/// column; an empty map switches to fixed positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn from_columns(columns: &[String]) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(idx, c)| (c.clone(), idx))
            .collect();
        Self { positions }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Resolves `field` against one parsed record.
    pub fn resolve<'a>(&self, field: ImportField, values: &'a [String]) -> Option<&'a str> {
        let idx = if self.is_empty() {
            Some(field.position())
        } else {
            self.positions.get(field.column()).copied()
        };
        idx.and_then(|i| values.get(i)).map(String::as_str)
    }
}

// ==========================================
// HeaderSpec - resolved header
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub delimiter: u8,
    pub columns: Vec<String>,
    pub column_map: ColumnMap,
}

/// `;` only when strictly more frequent than `,`.
pub fn detect_delimiter(line: &str) -> u8 {
    let commas = line.matches(',').count();
    let semicolons = line.matches(';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Resolves the header line (without its `\n`).
///
/// # Returns
/// - Ok(HeaderSpec): delimiter plus lowercased, trimmed columns
/// - Err(HeaderInvalid): `name` column absent
pub fn resolve_header(line: &str) -> ImportResult<HeaderSpec> {
    let line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let delimiter = detect_delimiter(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|e| ImportError::MalformedCsv(e.to_string()))?;
    let columns: Vec<String> = record.iter().map(str::to_lowercase).collect();

    let column_map = ColumnMap::from_columns(&columns);
    if !column_map.contains(ImportField::Name.column()) {
        return Err(ImportError::missing_name_column());
    }

    Ok(HeaderSpec {
        delimiter,
        columns,
        column_map,
    })
}
