use crate::error::DataLoadError;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manufacturer {
    Boeing,
    Airbus,
    Fokker,
    Embraer,
    Atr,
    Bombardier,
}

impl Manufacturer {
    /// Exact-match mapping from the name column. Unrecognized names fall
    /// back to Boeing; existing fleet files rely on this.
    pub fn from_name(name: &str) -> Manufacturer {
        match name {
            "Boeing" => Manufacturer::Boeing,
            "Airbus" => Manufacturer::Airbus,
            "Fokker" => Manufacturer::Fokker,
            "Embraer" => Manufacturer::Embraer,
            "Atr" => Manufacturer::Atr,
            "Bombardier" => Manufacturer::Bombardier,
            _ => Manufacturer::Boeing,
        }
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Manufacturer::Boeing => "Boeing",
            Manufacturer::Airbus => "Airbus",
            Manufacturer::Fokker => "Fokker",
            Manufacturer::Embraer => "Embraer",
            Manufacturer::Atr => "Atr",
            Manufacturer::Bombardier => "Bombardier",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub tail_code: String,
    pub type_code: String,
    pub manufacturer: Manufacturer,
    pub model: String,
    pub seats: u32,
    pub cabin_crew_required: u32,
    pub starting_position: String,
}

/// Recovery policy for numeric fields that tolerate junk: unparsable text
/// becomes zero instead of failing the row.
pub fn parse_or_zero(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

#[derive(Default)]
pub struct AircraftStore {
    aircraft: Vec<Aircraft>,
}

impl AircraftStore {
    pub fn new() -> AircraftStore {
        AircraftStore { aircraft: Vec::new() }
    }

    /// Loads a fleet file, appending to whatever is already held. Repeated
    /// calls are cumulative. On a malformed row the whole call fails, but
    /// rows appended earlier in the same call are kept.
    pub fn load(&mut self, path: &Path) -> Result<(), DataLoadError> {
        let data = std::fs::read_to_string(path)?;
        self.load_str(&data)
    }

    pub fn load_str(&mut self, data: &str) -> Result<(), DataLoadError> {
        let before = self.aircraft.len();
        // First line is the header.
        for (row, line) in data.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let field = |idx: usize, name: &'static str| {
                fields
                    .get(idx)
                    .copied()
                    .ok_or(DataLoadError::MissingField { row, field: name })
            };

            let tail_code = field(0, "TailCode")?;
            let type_code = field(1, "TypeCode")?;
            let manufacturer = field(2, "Manufacturer")?;
            let model = field(3, "Model")?;
            let seats = field(4, "Seats")?.trim().parse().map_err(|source| {
                DataLoadError::BadNumber { field: "Seats", source }
            })?;
            let cabin_crew_required = parse_or_zero(field(5, "CabinCrewRequired")?);
            let starting_position = field(6, "StartingPosition")?;

            log::debug!("aircraft {} is a {} with {} seats", tail_code, type_code, seats);

            self.aircraft.push(Aircraft {
                tail_code: tail_code.to_string(),
                type_code: type_code.to_string(),
                manufacturer: Manufacturer::from_name(manufacturer),
                model: model.to_string(),
                seats,
                cabin_crew_required,
                starting_position: starting_position.to_string(),
            });
        }
        log::info!("{} aircraft loaded, {} held", self.aircraft.len() - before, self.aircraft.len());
        Ok(())
    }

    /// All aircraft with at least `min` seats.
    pub fn find_by_seats(&self, min: u32) -> Vec<&Aircraft> {
        self.aircraft.iter().filter(|a| a.seats >= min).collect()
    }

    pub fn find_by_starting_position(&self, code: &str) -> Vec<&Aircraft> {
        self.aircraft
            .iter()
            .filter(|a| a.starting_position.eq_ignore_ascii_case(code))
            .collect()
    }

    pub fn find_by_tail_code(&self, tail_code: &str) -> Option<&Aircraft> {
        self.aircraft.iter().find(|a| a.tail_code == tail_code)
    }

    pub fn find_by_type(&self, type_code: &str) -> Vec<&Aircraft> {
        self.aircraft.iter().filter(|a| a.type_code == type_code).collect()
    }

    pub fn all(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn count(&self) -> usize {
        self.aircraft.len()
    }

    pub fn reset(&mut self) {
        self.aircraft.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLEET: &str = "\
TailCode,TypeCode,Manufacturer,Model,Seats,CabinCrewRequired,StartingPosition
G-ABCD,B738,Boeing,737-800,189,4,MAN
G-EFGH,A320,Airbus,A320-200,180,4,LGW
G-IJKL,AT76,Atr,72-600,70,2,man
";

    #[test]
    fn test_load_is_cumulative_and_reset_clears() {
        let mut store = AircraftStore::new();
        store.load_str(FLEET).unwrap();
        assert_eq!(store.count(), 3);
        store.load_str(FLEET).unwrap();
        assert_eq!(store.count(), 6);
        store.reset();
        assert_eq!(store.count(), 0);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_find_by_seats_is_inclusive() {
        let mut store = AircraftStore::new();
        store.load_str(FLEET).unwrap();
        let found = store.find_by_seats(180);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|a| a.seats >= 180));
        assert!(found.iter().all(|a| store.all().contains(a)));
    }

    #[test]
    fn test_starting_position_ignores_case() {
        let mut store = AircraftStore::new();
        store.load_str(FLEET).unwrap();
        assert_eq!(store.find_by_starting_position("MAN").len(), 2);
        assert_eq!(store.find_by_starting_position("lgw").len(), 1);
    }

    #[test]
    fn test_tail_code_lookup_is_optional() {
        let mut store = AircraftStore::new();
        store.load_str(FLEET).unwrap();
        assert_eq!(store.find_by_tail_code("G-EFGH").unwrap().model, "A320-200");
        assert!(store.find_by_tail_code("G-ZZZZ").is_none());
    }

    #[test]
    fn test_find_by_type() {
        let mut store = AircraftStore::new();
        store.load_str(FLEET).unwrap();
        store.load_str(FLEET).unwrap();
        assert_eq!(store.find_by_type("B738").len(), 2);
        assert_eq!(store.find_by_type("B77W").len(), 0);
    }

    #[test]
    fn test_missing_starting_position_fails_but_keeps_prior_rows() {
        let broken = "\
TailCode,TypeCode,Manufacturer,Model,Seats,CabinCrewRequired,StartingPosition
G-ABCD,B738,Boeing,737-800,189,4,MAN
G-EFGH,A320,Airbus,A320-200,180,4
";
        let mut store = AircraftStore::new();
        let err = store.load_str(broken).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingField { field: "StartingPosition", .. }
        ));
        // No rollback: the first row survives the failed call.
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_unparsable_seats_fails_the_call() {
        let broken = "\
TailCode,TypeCode,Manufacturer,Model,Seats,CabinCrewRequired,StartingPosition
G-ABCD,B738,Boeing,737-800,lots,4,MAN
";
        let mut store = AircraftStore::new();
        let err = store.load_str(broken).unwrap_err();
        assert!(matches!(err, DataLoadError::BadNumber { field: "Seats", .. }));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_unparsable_cabin_crew_defaults_to_zero() {
        let fleet = "\
TailCode,TypeCode,Manufacturer,Model,Seats,CabinCrewRequired,StartingPosition
G-ABCD,B738,Boeing,737-800,189,n/a,MAN
";
        let mut store = AircraftStore::new();
        store.load_str(fleet).unwrap();
        assert_eq!(store.all()[0].cabin_crew_required, 0);
    }

    #[test]
    fn test_unknown_manufacturer_falls_back_to_boeing() {
        let fleet = "\
TailCode,TypeCode,Manufacturer,Model,Seats,CabinCrewRequired,StartingPosition
G-ABCD,SF50,Cirrus,Vision Jet,5,0,MAN
";
        let mut store = AircraftStore::new();
        store.load_str(fleet).unwrap();
        assert_eq!(store.all()[0].manufacturer, Manufacturer::Boeing);
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero("4"), 4);
        assert_eq!(parse_or_zero(" 12 "), 12);
        assert_eq!(parse_or_zero(""), 0);
        assert_eq!(parse_or_zero("four"), 0);
        assert_eq!(parse_or_zero("-3"), 0);
    }
}
