//! Line-oriented reader for delimited SMILES files.

use std::io::{self, BufRead};

/// One non-blank line split into its SMILES and name fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the input.
    pub line: usize,
    pub smiles: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplierItem {
    Record(RawRecord),
    /// The line has fewer fields than the SMILES column needs.
    MissingColumn { line: usize, column: usize },
    /// The line is not valid UTF-8; `offset` is the first bad byte.
    InvalidUtf8 { line: usize, offset: usize },
}

/// Yields the records of a delimited SMILES file in order.
///
/// Fields are separated by any character of the delimiter set and runs of
/// delimiters collapse, so leading or doubled separators never produce
/// empty fields. Blank lines are passed over silently. A record whose name
/// column is absent is named by its line number. Lines are read as bytes,
/// so one badly encoded line is reported without ending the iteration.
#[derive(Debug)]
pub struct SmilesSupplier<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    delimiters: String,
    smiles_column: usize,
    name_column: Option<usize>,
    title_line: bool,
}

impl<R: BufRead> SmilesSupplier<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            delimiters: " \t".to_string(),
            smiles_column: 1,
            name_column: Some(0),
            title_line: false,
        }
    }

    pub fn delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.delimiters = delimiters.into();
        self
    }

    pub fn smiles_column(mut self, column: usize) -> Self {
        self.smiles_column = column;
        self
    }

    pub fn name_column(mut self, column: Option<usize>) -> Self {
        self.name_column = column;
        self
    }

    /// Treat the first line as a header and skip it.
    pub fn title_line(mut self, title_line: bool) -> Self {
        self.title_line = title_line;
        self
    }

    fn split_line(&self, line: usize, text: &str) -> SupplierItem {
        let fields: Vec<&str> = text
            .split(|c: char| self.delimiters.contains(c))
            .filter(|field| !field.is_empty())
            .collect();
        let Some(smiles) = fields.get(self.smiles_column) else {
            return SupplierItem::MissingColumn {
                line,
                column: self.smiles_column,
            };
        };
        let name = self
            .name_column
            .and_then(|col| fields.get(col))
            .map_or_else(|| line.to_string(), |name| name.to_string());
        SupplierItem::Record(RawRecord {
            line,
            smiles: smiles.to_string(),
            name,
        })
    }
}

impl<R: BufRead> Iterator for SmilesSupplier<R> {
    type Item = io::Result<SupplierItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err)),
            }
            self.line += 1;
            if self.line == 1 && self.title_line {
                continue;
            }
            let bytes = strip_line_ending(&self.buf);
            let text = match std::str::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => {
                    return Some(Ok(SupplierItem::InvalidUtf8 {
                        line: self.line,
                        offset: err.valid_up_to(),
                    }))
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(Ok(self.split_line(self.line, text)));
        }
    }
}

fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn records(input: &str) -> Vec<SupplierItem> {
        SmilesSupplier::new(Cursor::new(input))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    fn record(line: usize, smiles: &str, name: &str) -> SupplierItem {
        SupplierItem::Record(RawRecord {
            line,
            smiles: smiles.to_string(),
            name: name.to_string(),
        })
    }

    #[test]
    fn name_then_smiles_by_default() {
        assert_eq!(
            records("m1 CCO\nm2\tc1ccccc1\n"),
            vec![record(1, "CCO", "m1"), record(2, "c1ccccc1", "m2")]
        );
    }

    #[test]
    fn delimiter_runs_collapse() {
        assert_eq!(records("  m1 \t  CCO  \n"), vec![record(1, "CCO", "m1")]);
    }

    #[test]
    fn blank_lines_keep_line_numbers() {
        assert_eq!(
            records("m1 C\n\n   \nm2 N\n"),
            vec![record(1, "C", "m1"), record(4, "N", "m2")]
        );
    }

    #[test]
    fn short_lines_are_reported() {
        assert_eq!(
            records("lonely\nm2 N"),
            vec![
                SupplierItem::MissingColumn { line: 1, column: 1 },
                record(2, "N", "m2"),
            ]
        );
    }

    #[test]
    fn title_line_is_skipped() {
        let items: Vec<_> = SmilesSupplier::new(Cursor::new("id smiles\nm1 CO\n"))
            .title_line(true)
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(items, vec![record(2, "CO", "m1")]);
    }

    #[test]
    fn custom_columns_and_delimiters() {
        let items: Vec<_> = SmilesSupplier::new(Cursor::new("CCO,ethanol,x\nCN,,y\n"))
            .delimiters(",")
            .smiles_column(0)
            .name_column(Some(2))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(items, vec![record(1, "CCO", "x"), record(2, "CN", "2")]);
    }

    #[test]
    fn records_without_names_use_line_numbers() {
        let items: Vec<_> = SmilesSupplier::new(Cursor::new("\nCCO\n"))
            .smiles_column(0)
            .name_column(None)
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(items, vec![record(2, "CCO", "2")]);

        let items: Vec<_> = SmilesSupplier::new(Cursor::new("CCO\n"))
            .smiles_column(0)
            .name_column(Some(1))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(items, vec![record(1, "CCO", "1")]);
    }

    #[test]
    fn badly_encoded_lines_are_reported_in_place() {
        let input: &[u8] = b"a CCO\ncaf\xe9 CCN\r\nc CCC\r\n";
        let items: Vec<_> = SmilesSupplier::new(input)
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            items,
            vec![
                record(1, "CCO", "a"),
                SupplierItem::InvalidUtf8 { line: 2, offset: 3 },
                record(3, "CCC", "c"),
            ]
        );
    }

    #[test]
    fn last_line_without_newline() {
        assert_eq!(records("m1 C\r\nm2 N"), vec![record(1, "C", "m1"), record(2, "N", "m2")]);
    }
}
