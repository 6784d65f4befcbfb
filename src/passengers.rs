use crate::error::DataLoadError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

/// Cache of forecast passenger numbers keyed by the date column's text and
/// the flight number. Same-key rows from later loads overwrite earlier ones.
#[derive(Default)]
pub struct PassengerNumbersStore {
    cache: HashMap<(String, u32), u32>,
}

impl PassengerNumbersStore {
    pub fn new() -> PassengerNumbersStore {
        PassengerNumbersStore { cache: HashMap::new() }
    }

    /// Scans the PassengerNumbers table of the given SQLite database into
    /// the cache. Rows cached before a mid-scan failure remain.
    pub fn load(&mut self, path: &Path) -> Result<(), DataLoadError> {
        let conn = Connection::open(path)?;
        let mut stmt = conn.prepare("SELECT Date, FlightNumber, Passengers FROM PassengerNumbers")?;
        let mut scanned = 0usize;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;
        for row in rows {
            let (date, flight_number, passengers) = row?;
            self.cache.insert((date, flight_number), passengers);
            scanned += 1;
        }
        log::info!("{} rows scanned, {} forecasts cached", scanned, self.cache.len());
        Ok(())
    }

    /// Forecast passengers for a flight on a date, or -1 when no forecast
    /// was loaded for that pair. Never an error.
    pub fn passenger_numbers_for(&self, flight_number: u32, date: NaiveDate) -> i64 {
        let key = (date.format("%Y-%m-%d").to_string(), flight_number);
        self.cache.get(&key).map_or(-1, |&p| i64::from(p))
    }

    pub fn entries(&self) -> &HashMap<(String, u32), u32> {
        &self.cache
    }

    pub fn count(&self) -> usize {
        self.cache.len()
    }

    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn forecast_db(rows: &[(&str, u32, u32)]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute(
            "CREATE TABLE PassengerNumbers (Date TEXT, FlightNumber INTEGER, Passengers INTEGER)",
            [],
        )
        .unwrap();
        for (date, flight, pax) in rows {
            conn.execute(
                "INSERT INTO PassengerNumbers VALUES (?1, ?2, ?3)",
                rusqlite::params![date, flight, pax],
            )
            .unwrap();
        }
        file
    }

    #[test]
    fn test_hit_and_miss() {
        let db = forecast_db(&[("2023-05-01", 101, 150), ("2023-05-01", 102, 80)]);
        let mut store = PassengerNumbersStore::new();
        store.load(db.path()).unwrap();

        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        assert_eq!(store.passenger_numbers_for(101, date), 150);
        assert_eq!(store.passenger_numbers_for(102, date), 80);
        assert_eq!(store.passenger_numbers_for(999, date), -1);
        let other = NaiveDate::from_ymd_opt(2023, 5, 2).unwrap();
        assert_eq!(store.passenger_numbers_for(101, other), -1);
    }

    #[test]
    fn test_same_key_overwrites_on_reload() {
        let first = forecast_db(&[("2023-05-01", 101, 150)]);
        let second = forecast_db(&[("2023-05-01", 101, 175), ("2023-05-02", 101, 90)]);
        let mut store = PassengerNumbersStore::new();
        store.load(first.path()).unwrap();
        store.load(second.path()).unwrap();

        assert_eq!(store.count(), 2);
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        assert_eq!(store.passenger_numbers_for(101, date), 175);
    }

    #[test]
    fn test_count_and_reset() {
        let db = forecast_db(&[("2023-05-01", 101, 150), ("2023-05-02", 101, 140)]);
        let mut store = PassengerNumbersStore::new();
        store.load(db.path()).unwrap();
        assert_eq!(store.count(), 2);
        assert_eq!(store.entries().len(), 2);
        store.reset();
        assert_eq!(store.count(), 0);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_missing_table_is_a_load_error() {
        let file = NamedTempFile::new().unwrap();
        Connection::open(file.path()).unwrap();
        let mut store = PassengerNumbersStore::new();
        let err = store.load(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::Database(_)));
        assert_eq!(store.count(), 0);
    }
}
