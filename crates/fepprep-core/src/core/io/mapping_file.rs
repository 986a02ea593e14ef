use crate::core::models::mapping::AtomMapping;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: u64,
        kind: MappingParseErrorKind,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingParseErrorKind {
    #[error("Expected at least two comma-separated fields, found {found}")]
    TooFewFields { found: usize },

    #[error("Invalid atom index in field {field} (value: '{value}')")]
    InvalidIndex { field: usize, value: String },
}

#[derive(Debug, Serialize)]
struct MappingRecord {
    index0: usize,
    index1: usize,
}

/// The plain-text atom mapping format.
///
/// One `index0,index1` record per line. Lines starting with `#` are comments, blank lines
/// are ignored and any fields after the second are ignored. A repeated `index0` keeps the
/// value of its last occurrence.
pub struct MappingFile;

impl MappingFile {
    pub fn read_from(reader: impl Read) -> Result<AtomMapping, MappingFileError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut pairs = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |pos| pos.line());

            if record.len() < 2 {
                return Err(MappingFileError::Parse {
                    line,
                    kind: MappingParseErrorKind::TooFewFields {
                        found: record.len(),
                    },
                });
            }

            let parse_field = |field: usize| -> Result<usize, MappingFileError> {
                let value = &record[field];
                value.parse().map_err(|_| MappingFileError::Parse {
                    line,
                    kind: MappingParseErrorKind::InvalidIndex {
                        field: field + 1,
                        value: value.to_string(),
                    },
                })
            };
            pairs.push((parse_field(0)?, parse_field(1)?));
        }

        Ok(AtomMapping::from_pairs(pairs))
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<AtomMapping, MappingFileError> {
        let file = File::open(path)?;
        Self::read_from(file)
    }

    /// Writes `mapping` in mapping order, one `index0,index1` record per line.
    pub fn write_to(mapping: &AtomMapping, writer: impl Write) -> Result<(), MappingFileError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for (index0, index1) in mapping.iter() {
            csv_writer.serialize(MappingRecord { index0, index1 })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        mapping: &AtomMapping,
        path: P,
    ) -> Result<(), MappingFileError> {
        let file = File::create(path)?;
        Self::write_to(mapping, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> Result<AtomMapping, MappingFileError> {
        MappingFile::read_from(content.as_bytes())
    }

    #[test]
    fn repeated_index_keeps_last_occurrence() {
        let mapping = parse("1,2\n1,3\n").unwrap();
        assert_eq!(mapping, AtomMapping::from_pairs([(1, 3)]));
    }

    #[test]
    fn comment_lines_are_ignored_anywhere() {
        assert_eq!(
            parse("#c\n1,2\n").unwrap(),
            AtomMapping::from_pairs([(1, 2)])
        );
        assert_eq!(
            parse("0,4\n# trailing note, with comma\n5,6\n").unwrap(),
            AtomMapping::from_pairs([(0, 4), (5, 6)])
        );
    }

    #[test]
    fn preserves_file_order_and_ignores_extra_fields() {
        let mapping = parse("7, 1\n2,0,extra\n\n3 ,5\n").unwrap();
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(7, 1), (2, 0), (3, 5)]);
    }

    #[test]
    fn single_field_line_is_rejected_with_line_number() {
        let err = parse("1,2\n3\n").unwrap_err();
        match err {
            MappingFileError::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert_eq!(kind, MappingParseErrorKind::TooFewFields { found: 1 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_integer_fields_are_rejected() {
        let err = parse("1,x\n").unwrap_err();
        assert!(matches!(
            err,
            MappingFileError::Parse {
                line: 1,
                kind: MappingParseErrorKind::InvalidIndex { field: 2, .. }
            }
        ));
        assert!(matches!(
            parse("-1,2\n").unwrap_err(),
            MappingFileError::Parse { .. }
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = MappingFile::read_from_path(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(MappingFileError::Io(_))));
    }

    #[test]
    fn written_file_reads_back_in_the_same_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        let mapping = AtomMapping::from_pairs([(4, 5), (0, 1), (9, 2)]);

        MappingFile::write_to_path(&mapping, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "4,5\n0,1\n9,2\n");

        let reread = MappingFile::read_from_path(&path).unwrap();
        assert_eq!(reread.iter().collect::<Vec<_>>(), mapping.iter().collect::<Vec<_>>());
    }
}
