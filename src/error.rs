use std::num::ParseIntError;
use thiserror::Error;

/// Single failure kind for every load operation. Queries never return this:
/// a miss is an empty Vec, a None, or the documented -1 sentinel.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("could not read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed crew document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed route document: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("passenger database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("row {row}: missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },
    #[error("Route element {index}: missing child element `{name}`")]
    MissingElement { index: usize, name: &'static str },
    #[error("bad numeric value for `{field}`: {source}")]
    BadNumber {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("bad time `{text}`: {source}")]
    BadTime {
        text: String,
        #[source]
        source: chrono::format::ParseError,
    },
    #[error("bad ISO-8601 duration `{0}`")]
    BadDuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_messages_name_the_failure_site() {
        let err = DataLoadError::MissingField { row: 3, field: "StartingPosition" };
        assert_eq!(err.to_string(), "row 3: missing required field `StartingPosition`");

        let err = DataLoadError::MissingElement { index: 1, name: "Duration" };
        assert_eq!(err.to_string(), "Route element 1: missing child element `Duration`");

        let err = DataLoadError::BadDuration("2.5 hours".to_string());
        assert_eq!(err.to_string(), "bad ISO-8601 duration `2.5 hours`");
    }

    #[test]
    fn test_variants_carry_their_cause() {
        let parse_err = "lots".parse::<u32>().unwrap_err();
        let err = DataLoadError::BadNumber { field: "Seats", source: parse_err };
        assert!(err.source().is_some());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DataLoadError::from(io_err);
        assert!(matches!(err, DataLoadError::Io(_)));
        assert!(err.source().is_some());
    }
}
