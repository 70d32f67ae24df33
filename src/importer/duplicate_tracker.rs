// ==========================================
// Tecnova POS - in-file duplicate tracker
// ==========================================
// Responsibility: first occurrence of a name / barcode wins,
//                 later repeats become DUP_IN_FILE
// Scope: one instance per import run
// ==========================================

use crate::domain::import::{CandidateRow, RowError, RowErrorCode};
use crate::i18n::t;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen_names: HashSet<String>,
    seen_barcodes: HashSet<String>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a validated row and records its keys on first sight.
    ///
    /// # Returns
    /// - None: keys recorded, row accepted
    /// - Some(RowError): DUP_IN_FILE; keys are not recorded
    pub fn check(&mut self, row: usize, candidate: &CandidateRow) -> Option<RowError> {
        let dup_by_name = self.seen_names.contains(&candidate.name);
        let dup_by_barcode = candidate
            .barcode
            .as_ref()
            .map(|b| self.seen_barcodes.contains(b))
            .unwrap_or(false);

        if dup_by_name || dup_by_barcode {
            let message = if dup_by_barcode {
                t("row.dup_barcode_in_file")
            } else {
                t("row.dup_name_in_file")
            };
            return Some(RowError::new(row, RowErrorCode::DupInFile, message));
        }

        self.seen_names.insert(candidate.name.clone());
        if let Some(barcode) = &candidate.barcode {
            self.seen_barcodes.insert(barcode.clone());
        }
        None
    }
}
