// ==========================================
// Tecnova POS - row normalizer
// ==========================================
// Responsibility: RawRow -> CandidateRow, or every field
//                 violation of that row as RowError
// Pure: no I/O, no shared state
// ==========================================

use crate::domain::import::{CandidateRow, ProductStatus, RowError, RowErrorCode};
use crate::i18n::{t, t_with_args};
use crate::importer::header_resolver::ImportField;
use crate::importer::stream_coordinator::RawRow;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub const NAME_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 512;
pub const BARCODE_MAX_CHARS: usize = 64;
pub const PRICE_MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);
pub const STOCK_MAX: i64 = 1_000_000;

/// Trimmed value, or None when absent or blank.
pub fn sanitize(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Outcome of reading a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// column missing from the header, or a short row
    Absent,
    Invalid,
    Value(Decimal),
}

/// Strips all whitespace, maps `,` to `.`, parses a decimal.
///
/// A present but blank cell reads as zero.
pub fn parse_numeric(raw: Option<&str>) -> NumericCell {
    let compact: String = match raw {
        Some(v) => v
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect(),
        None => return NumericCell::Absent,
    };

    if compact.is_empty() {
        return NumericCell::Value(Decimal::ZERO);
    }

    match compact
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&compact))
    {
        Ok(v) => NumericCell::Value(v),
        Err(_) => NumericCell::Invalid,
    }
}

fn field_error(row: usize, field: ImportField, code: RowErrorCode, message: String) -> RowError {
    RowError::on_column(row, field.column(), code, message)
}

fn check_length(
    row: usize,
    field: ImportField,
    value: &Option<String>,
    max: usize,
    key: &str,
    errors: &mut Vec<RowError>,
) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.push(field_error(
                row,
                field,
                RowErrorCode::OutOfRange,
                t_with_args(key, &[("max", &max.to_string())]),
            ));
        }
    }
}

fn normalize_price(row: usize, raw: Option<&str>, errors: &mut Vec<RowError>) -> Option<Decimal> {
    let field = ImportField::Price;
    match parse_numeric(raw) {
        NumericCell::Absent | NumericCell::Invalid => {
            errors.push(field_error(row, field, RowErrorCode::BadFormat, t("row.price_invalid")));
            None
        }
        NumericCell::Value(v) if v.is_sign_negative() && !v.is_zero() => {
            errors.push(field_error(row, field, RowErrorCode::OutOfRange, t("row.price_negative")));
            None
        }
        NumericCell::Value(v) if v > PRICE_MAX => {
            errors.push(field_error(
                row,
                field,
                RowErrorCode::OutOfRange,
                t_with_args("row.price_too_big", &[("max", &PRICE_MAX.to_string())]),
            ));
            None
        }
        NumericCell::Value(v) => Some(v),
    }
}

fn normalize_stock(row: usize, raw: Option<&str>, errors: &mut Vec<RowError>) -> Option<i64> {
    let field = ImportField::Stock;
    let value = match parse_numeric(raw) {
        NumericCell::Absent | NumericCell::Invalid => {
            errors.push(field_error(row, field, RowErrorCode::BadFormat, t("row.stock_invalid")));
            return None;
        }
        NumericCell::Value(v) => v.trunc(),
    };

    if value.is_sign_negative() && !value.is_zero() {
        errors.push(field_error(row, field, RowErrorCode::OutOfRange, t("row.stock_negative")));
        return None;
    }
    match value.to_i64() {
        Some(stock) if stock <= STOCK_MAX => Some(stock),
        _ => {
            errors.push(field_error(
                row,
                field,
                RowErrorCode::OutOfRange,
                t_with_args("row.stock_too_big", &[("max", &STOCK_MAX.to_string())]),
            ));
            None
        }
    }
}

/// Normalises and validates one parsed record.
///
/// # Arguments
/// - raw: parsed record with its resolution strategy
///
/// # Returns
/// - Ok(CandidateRow): canonical values, ready for duplicate checks
/// - Err(Vec<RowError>): one entry per violating field, never empty
pub fn normalize_row(raw: &RawRow) -> Result<CandidateRow, Vec<RowError>> {
    let row = raw.row;
    let mut errors = Vec::new();

    let name = sanitize(raw.get(ImportField::Name));
    let description = sanitize(raw.get(ImportField::Description));
    let barcode = sanitize(raw.get(ImportField::Barcode));
    let status_raw = sanitize(raw.get(ImportField::Status));

    if name.is_none() {
        errors.push(field_error(
            row,
            ImportField::Name,
            RowErrorCode::Required,
            t("row.name_required"),
        ));
    }
    check_length(row, ImportField::Name, &name, NAME_MAX_CHARS, "row.name_too_long", &mut errors);
    check_length(
        row,
        ImportField::Description,
        &description,
        DESCRIPTION_MAX_CHARS,
        "row.description_too_long",
        &mut errors,
    );
    check_length(
        row,
        ImportField::Barcode,
        &barcode,
        BARCODE_MAX_CHARS,
        "row.barcode_too_long",
        &mut errors,
    );

    let price = normalize_price(row, raw.get(ImportField::Price), &mut errors);
    let stock = normalize_stock(row, raw.get(ImportField::Stock), &mut errors);

    let status = match status_raw.as_deref() {
        None => Some(ProductStatus::default()),
        Some(v) => {
            let parsed = ProductStatus::parse(v);
            if parsed.is_none() {
                errors.push(field_error(
                    row,
                    ImportField::Status,
                    RowErrorCode::BadFormat,
                    t("row.status_invalid"),
                ));
            }
            parsed
        }
    };

    match (name, price, stock, status) {
        (Some(name), Some(price), Some(stock), Some(status)) if errors.is_empty() => {
            Ok(CandidateRow {
                name,
                description,
                barcode,
                price,
                stock,
                status,
            })
        }
        _ => Err(errors),
    }
}
