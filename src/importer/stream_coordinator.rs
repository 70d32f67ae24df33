// ==========================================
// Tecnova POS - upload stream coordinator
// ==========================================
// Push-driven state machine:
//   AwaitingHeader -> Streaming -> Finished
//   any state      -> Aborted   (size cap, bad header, bad CSV)
// Callers feed byte chunks in arrival order and receive the
// complete records each chunk closes. Independent of the I/O
// style driving it.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_resolver::{resolve_header, ColumnMap, HeaderSpec, ImportField};
use csv_core::ReadRecordResult;
use std::str::Utf8Error;
use std::sync::Arc;
use tracing::{debug, warn};

const INITIAL_FIELD_BYTES: usize = 1024;
const INITIAL_FIELD_COUNT: usize = 16;

// ==========================================
// RawRow - one parsed data record
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based data-row number (blank lines are not numbered)
    pub row: usize,
    pub columns: Arc<ColumnMap>,
    pub values: Vec<String>,
}

impl RawRow {
    pub fn get(&self, field: ImportField) -> Option<&str> {
        self.columns.resolve(field, &self.values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingHeader,
    Streaming,
    Finished,
    Aborted,
}

// ==========================================
// StreamCoordinator
// ==========================================
pub struct StreamCoordinator {
    state: CoordinatorState,
    max_bytes: usize,
    received: usize,
    // bytes seen before the header line is complete
    pending_header: Vec<u8>,
    // one reader for the whole body; quote state survives chunk edges
    reader: csv_core::Reader,
    fields: Vec<u8>,
    fields_len: usize,
    ends: Vec<usize>,
    ends_len: usize,
    header: Option<HeaderSpec>,
    columns: Arc<ColumnMap>,
    rows_emitted: usize,
}

impl StreamCoordinator {
    /// # Arguments
    /// - max_bytes: cumulative upload cap; exceeding it aborts
    pub fn new(max_bytes: usize) -> Self {
        Self {
            state: CoordinatorState::AwaitingHeader,
            max_bytes,
            received: 0,
            pending_header: Vec::new(),
            reader: csv_core::Reader::new(),
            fields: vec![0; INITIAL_FIELD_BYTES],
            fields_len: 0,
            ends: vec![0; INITIAL_FIELD_COUNT],
            ends_len: 0,
            header: None,
            columns: Arc::new(ColumnMap::default()),
            rows_emitted: 0,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn header(&self) -> Option<&HeaderSpec> {
        self.header.as_ref()
    }

    pub fn bytes_received(&self) -> usize {
        self.received
    }

    /// Accepts the next chunk.
    ///
    /// # Returns
    /// - Ok(Vec<RawRow>): records completed by this chunk (maybe none)
    /// - Err: structural failure; the coordinator is now Aborted
    pub fn feed(&mut self, chunk: &[u8]) -> ImportResult<Vec<RawRow>> {
        self.ensure_open()?;

        self.received += chunk.len();
        if self.received > self.max_bytes {
            warn!(
                received = self.received,
                limit = self.max_bytes,
                "upload exceeds size cap"
            );
            return Err(self.abort(ImportError::FileTooLarge {
                limit: self.max_bytes,
            }));
        }

        if self.state == CoordinatorState::AwaitingHeader {
            self.pending_header.extend_from_slice(chunk);
            let newline = match self.pending_header.iter().position(|b| *b == b'\n') {
                Some(pos) => pos,
                None => return Ok(Vec::new()),
            };
            let body = self.pending_header.split_off(newline + 1);
            let line = std::mem::take(&mut self.pending_header);
            self.accept_header(&line[..newline])?;
            return self.read_records(&body, false);
        }

        self.read_records(chunk, false)
    }

    /// Signals end of upload.
    ///
    /// A stream without any newline is treated as a header-only file.
    pub fn finish(&mut self) -> ImportResult<Vec<RawRow>> {
        self.ensure_open()?;

        if self.state == CoordinatorState::AwaitingHeader {
            let line = std::mem::take(&mut self.pending_header);
            self.accept_header(&line)?;
        }

        let rows = self.read_records(&[], true)?;
        self.state = CoordinatorState::Finished;
        debug!(rows = self.rows_emitted, bytes = self.received, "upload fully parsed");
        Ok(rows)
    }

    // ===== transitions =====

    fn ensure_open(&self) -> ImportResult<()> {
        match self.state {
            CoordinatorState::AwaitingHeader | CoordinatorState::Streaming => Ok(()),
            CoordinatorState::Finished | CoordinatorState::Aborted => Err(ImportError::Upload(
                "el flujo de carga ya fue cerrado".to_string(),
            )),
        }
    }

    fn abort(&mut self, err: ImportError) -> ImportError {
        self.state = CoordinatorState::Aborted;
        self.pending_header.clear();
        self.fields_len = 0;
        self.ends_len = 0;
        err
    }

    fn accept_header(&mut self, line: &[u8]) -> ImportResult<()> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => return Err(self.abort(ImportError::MalformedCsv(e.to_string()))),
        };

        match resolve_header(text) {
            Ok(parsed) => {
                debug!(
                    delimiter = %(parsed.delimiter as char),
                    columns = ?parsed.columns,
                    "header resolved"
                );
                self.reader = csv_core::ReaderBuilder::new()
                    .delimiter(parsed.delimiter)
                    .build();
                self.columns = Arc::new(parsed.column_map.clone());
                self.header = Some(parsed);
                self.state = CoordinatorState::Streaming;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "header rejected");
                Err(self.abort(e))
            }
        }
    }

    // ===== record parsing =====

    /// Runs `input` through the reader. A partial trailing record stays
    /// inside the reader until the next chunk; `eof` flushes it.
    fn read_records(&mut self, mut input: &[u8], eof: bool) -> ImportResult<Vec<RawRow>> {
        let mut rows = Vec::new();

        loop {
            // an empty input means end-of-data to csv_core
            if input.is_empty() && !eof {
                break;
            }

            let (result, nin, nout, nend) = self.reader.read_record(
                input,
                &mut self.fields[self.fields_len..],
                &mut self.ends[self.ends_len..],
            );
            input = &input[nin..];
            self.fields_len += nout;
            self.ends_len += nend;

            match result {
                ReadRecordResult::InputEmpty => {
                    if eof {
                        break;
                    }
                }
                ReadRecordResult::OutputFull => {
                    let grown = self.fields.len() * 2;
                    self.fields.resize(grown, 0);
                }
                ReadRecordResult::OutputEndsFull => {
                    let grown = self.ends.len() * 2;
                    self.ends.resize(grown, 0);
                }
                ReadRecordResult::Record => {
                    if let Some(row) = self.take_record()? {
                        rows.push(row);
                    }
                }
                ReadRecordResult::End => break,
            }
        }

        Ok(rows)
    }

    fn take_record(&mut self) -> ImportResult<Option<RawRow>> {
        let decoded = decode_fields(
            &self.fields[..self.fields_len],
            &self.ends[..self.ends_len],
        );
        self.fields_len = 0;
        self.ends_len = 0;

        let values = match decoded {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, row = self.rows_emitted + 1, "malformed CSV body");
                return Err(self.abort(ImportError::MalformedCsv(e.to_string())));
            }
        };
        if is_blank(&values) {
            return Ok(None);
        }

        self.rows_emitted += 1;
        Ok(Some(RawRow {
            row: self.rows_emitted,
            columns: Arc::clone(&self.columns),
            values,
        }))
    }
}

/// Splits the reader's field buffer at `ends`, trimming every value.
fn decode_fields(fields: &[u8], ends: &[usize]) -> Result<Vec<String>, Utf8Error> {
    let mut values = Vec::with_capacity(ends.len());
    let mut start = 0;
    for &end in ends {
        let value = std::str::from_utf8(&fields[start..end])?;
        values.push(value.trim().to_string());
        start = end;
    }
    Ok(values)
}

// whitespace-only lines trim down to one empty field
fn is_blank(values: &[String]) -> bool {
    values.len() == 1 && values[0].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(coordinator: &mut StreamCoordinator, chunks: &[&[u8]]) -> Vec<RawRow> {
        let mut rows = Vec::new();
        for chunk in chunks {
            rows.extend(coordinator.feed(chunk).unwrap());
        }
        rows.extend(coordinator.finish().unwrap());
        rows
    }

    #[test]
    fn test_header_then_rows() {
        let mut c = StreamCoordinator::new(1024);
        let rows = feed_all(&mut c, &[b"name;price\nMouse;10\nTeclado;20\n"]);

        assert_eq!(c.state(), CoordinatorState::Finished);
        assert_eq!(c.header().unwrap().delimiter, b';');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row, 2);
        assert_eq!(rows[1].get(ImportField::Name), Some("Teclado"));
        assert_eq!(rows[1].get(ImportField::Price), Some("20"));
    }

    #[test]
    fn test_header_split_across_chunks() {
        let mut c = StreamCoordinator::new(1024);
        assert!(c.feed(b"na").unwrap().is_empty());
        assert_eq!(c.state(), CoordinatorState::AwaitingHeader);
        let rows = feed_all(&mut c, &[b"me,price\r\nMouse,1"]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(ImportField::Price), Some("1"));
    }

    #[test]
    fn test_quoted_field_across_chunk_boundary() {
        let mut c = StreamCoordinator::new(1024);
        let rows = feed_all(
            &mut c,
            &[b"name,description\nMouse,\"linea uno, con", b" coma\nlinea dos\"\nTeclado,x\n"],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get(ImportField::Description),
            Some("linea uno, con coma\nlinea dos")
        );
        assert_eq!(rows[1].row, 2);
    }

    #[test]
    fn test_stray_quote_does_not_swallow_later_rows() {
        let body = b"name,description,price,stock\nMonitor 24\",x,1,1\nMouse,\"linea a\nlinea b\",2,2\nTeclado,y,3,3\n";

        for size in [1, 4, 9, body.len()] {
            let mut c = StreamCoordinator::new(1024);
            let chunks: Vec<&[u8]> = body.chunks(size).collect();
            let rows = feed_all(&mut c, &chunks);

            assert_eq!(rows.len(), 3, "chunk size {}", size);
            assert_eq!(rows[0].get(ImportField::Name), Some("Monitor 24\""));
            assert_eq!(rows[1].get(ImportField::Description), Some("linea a\nlinea b"));
            assert_eq!(rows[1].get(ImportField::Stock), Some("2"));
            assert_eq!(rows[2].get(ImportField::Name), Some("Teclado"));
        }
    }

    #[test]
    fn test_escaped_quotes_and_long_fields() {
        let long = "x".repeat(5000);
        let body = format!("name,description\n\"Cable \"\"HDMI\"\"\",{}\n", long);
        let mut c = StreamCoordinator::new(1 << 20);
        let rows = feed_all(&mut c, &[body.as_bytes()]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(ImportField::Name), Some("Cable \"HDMI\""));
        assert_eq!(rows[0].get(ImportField::Description).map(str::len), Some(5000));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let mut c = StreamCoordinator::new(1024);
        let rows = feed_all(&mut c, &[b"name\n\nA\n   \n\nB\n"]);
        let names: Vec<_> = rows.iter().map(|r| r.get(ImportField::Name)).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
        assert_eq!(rows[1].row, 2);
    }

    #[test]
    fn test_header_only_upload() {
        let mut c = StreamCoordinator::new(1024);
        assert!(feed_all(&mut c, &[b"name,price"]).is_empty());
        assert_eq!(c.state(), CoordinatorState::Finished);
    }

    #[test]
    fn test_size_cap_aborts() {
        let mut c = StreamCoordinator::new(10);
        assert!(c.feed(b"name\nabc").is_ok());
        let err = c.feed(b"defgh").unwrap_err();

        assert!(matches!(err, ImportError::FileTooLarge { limit: 10 }));
        assert_eq!(c.state(), CoordinatorState::Aborted);
        assert!(c.finish().is_err());
    }

    #[test]
    fn test_invalid_header_aborts() {
        let mut c = StreamCoordinator::new(1024);
        let err = c.feed(b"price,stock\n1,2\n").unwrap_err();
        assert!(matches!(err, ImportError::HeaderInvalid { .. }));
        assert_eq!(c.state(), CoordinatorState::Aborted);
    }

    #[test]
    fn test_empty_upload_fails_header_validation() {
        let mut c = StreamCoordinator::new(1024);
        assert!(matches!(
            c.finish().unwrap_err(),
            ImportError::HeaderInvalid { .. }
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut c = StreamCoordinator::new(1024);
        let err = c.feed(b"name\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, ImportError::MalformedCsv(_)));
    }
}
