//! CSV ingestion
//!
//! Reads TGAM recordings exported as CSV into a [`Session`]. Only the
//! `attention` and `meditation` columns are used; row order is the time axis.

use crate::error::ComputeError;
use crate::types::{Channel, Session};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reader for TGAM session CSV exports
pub struct SessionReader;

impl SessionReader {
    /// Read a session from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Session, ComputeError> {
        let path = path.as_ref();
        debug!("reading session from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a session from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Session, ComputeError> {
        let (attention, meditation) = read_columns(reader)?;
        Session::new(attention, meditation)
    }

    /// Read a session from an in-memory CSV string
    pub fn parse_str(csv: &str) -> Result<Session, ComputeError> {
        Self::from_reader(csv.as_bytes())
    }
}

/// Read the attention and meditation columns without validating the session
pub fn read_columns<R: Read>(reader: R) -> Result<(Vec<f64>, Vec<f64>), ComputeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let attention_idx = column_index(&headers, Channel::Attention)?;
    let meditation_idx = column_index(&headers, Channel::Meditation)?;

    let mut attention = Vec::new();
    let mut meditation = Vec::new();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        // Row numbers are 1-based and skip the header
        let row = row + 1;
        attention.push(parse_score(&record, attention_idx, Channel::Attention, row)?);
        meditation.push(parse_score(&record, meditation_idx, Channel::Meditation, row)?);
    }

    debug!("read {} rows", attention.len());
    Ok((attention, meditation))
}

fn column_index(headers: &csv::StringRecord, channel: Channel) -> Result<usize, ComputeError> {
    headers
        .iter()
        .position(|h| h == channel.as_str())
        .ok_or_else(|| ComputeError::MissingColumn(channel.as_str().to_string()))
}

fn parse_score(
    record: &csv::StringRecord,
    idx: usize,
    channel: Channel,
    row: usize,
) -> Result<f64, ComputeError> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Err(ComputeError::ParseError(format!(
            "row {row}: empty {channel} value"
        )));
    }
    raw.parse::<f64>().map_err(|e| {
        ComputeError::ParseError(format!("row {row}: invalid {channel} value '{raw}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidSession;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_basic_export() {
        let csv = "timestamp,attention,meditation,raw\n\
                   0,10,40,512\n\
                   1,80,55,498\n\
                   2,90,61,501\n";
        let session = SessionReader::parse_str(csv).unwrap();

        assert_eq!(session.len(), 3);
        assert_eq!(session.attention(), &[10.0, 80.0, 90.0]);
        assert_eq!(session.meditation(), &[40.0, 55.0, 61.0]);
    }

    #[test]
    fn test_column_order_independent() {
        let csv = "meditation, attention\n 30 , 70\n31,71.5\n";
        let session = SessionReader::parse_str(csv).unwrap();

        assert_eq!(session.attention(), &[70.0, 71.5]);
        assert_eq!(session.meditation(), &[30.0, 31.0]);
    }

    #[test]
    fn test_missing_column() {
        let csv = "attention,raw\n10,500\n";
        let err = SessionReader::parse_str(csv).unwrap_err();
        assert!(matches!(err, ComputeError::MissingColumn(ref c) if c == "meditation"));
    }

    #[test]
    fn test_invalid_cell() {
        let csv = "attention,meditation\n10,20\nabc,30\n";
        let err = SessionReader::parse_str(csv).unwrap_err();
        match err {
            ComputeError::ParseError(msg) => {
                assert!(msg.contains("row 2"));
                assert!(msg.contains("attention"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_cell_not_coerced() {
        let csv = "attention,meditation\n10,\n";
        let err = SessionReader::parse_str(csv).unwrap_err();
        assert!(matches!(err, ComputeError::ParseError(ref msg) if msg.contains("meditation")));
    }

    #[test]
    fn test_nan_cell_surfaces_as_invalid_session() {
        let csv = "attention,meditation\n10,20\nNaN,30\n";
        let err = SessionReader::parse_str(csv).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::NonFiniteScore {
                channel: Channel::Attention,
                index: 1
            })
        ));
    }

    #[test]
    fn test_header_only_is_empty_session() {
        let err = SessionReader::parse_str("attention,meditation\n").unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidSession(InvalidSession::Empty)
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SessionReader::from_path("/nonexistent/tgam/session.csv").unwrap_err();
        assert!(matches!(err, ComputeError::Io(_)));
    }
}
