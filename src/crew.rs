use crate::error::DataLoadError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Captain,
    FirstOfficer,
}

impl Rank {
    /// Unrecognized rank text demotes to FirstOfficer rather than failing;
    /// rosters in the wild carry historic labels.
    pub fn from_label(label: &str) -> Rank {
        match label {
            "CAPTAIN" => Rank::Captain,
            _ => Rank::FirstOfficer,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Captain => write!(f, "Captain"),
            Rank::FirstOfficer => write!(f, "First Officer"),
        }
    }
}

/// Shared capability of everyone on the roster, pilot or not.
pub trait CrewMember {
    fn forename(&self) -> &str;
    fn surname(&self) -> &str;
    fn home_base(&self) -> &str;
    fn type_ratings(&self) -> &HashSet<String>;

    fn has_rating(&self, type_code: &str) -> bool {
        self.type_ratings().contains(type_code)
    }

    fn full_name(&self) -> String {
        format!("{} {}", self.forename(), self.surname())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pilot {
    pub forename: String,
    pub surname: String,
    pub home_base: String,
    pub rank: Rank,
    pub type_ratings: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CabinCrew {
    pub forename: String,
    pub surname: String,
    pub home_base: String,
    pub type_ratings: HashSet<String>,
}

impl CrewMember for Pilot {
    fn forename(&self) -> &str {
        &self.forename
    }
    fn surname(&self) -> &str {
        &self.surname
    }
    fn home_base(&self) -> &str {
        &self.home_base
    }
    fn type_ratings(&self) -> &HashSet<String> {
        &self.type_ratings
    }
}

impl CrewMember for CabinCrew {
    fn forename(&self) -> &str {
        &self.forename
    }
    fn surname(&self) -> &str {
        &self.surname
    }
    fn home_base(&self) -> &str {
        &self.home_base
    }
    fn type_ratings(&self) -> &HashSet<String> {
        &self.type_ratings
    }
}

#[derive(Default)]
pub struct CrewStore {
    pilots: Vec<Pilot>,
    cabin_crew: Vec<CabinCrew>,
}

impl CrewStore {
    pub fn new() -> CrewStore {
        CrewStore { pilots: Vec::new(), cabin_crew: Vec::new() }
    }

    /// Loads a roster file, appending to the crew already held. The document
    /// carries two named top-level arrays, `pilots` and `cabincrew`, parsed
    /// by name so section order does not matter.
    pub fn load(&mut self, path: &Path) -> Result<(), DataLoadError> {
        let data = std::fs::read_to_string(path)?;
        self.load_str(&data)
    }

    pub fn load_str(&mut self, data: &str) -> Result<(), DataLoadError> {
        #[derive(Deserialize)]
        struct RawPilot {
            forename: String,
            surname: String,
            homebase: String,
            rank: String,
            #[serde(rename = "typeRatings")]
            type_ratings: Vec<String>,
        }
        #[derive(Deserialize)]
        struct RawCabinCrew {
            forename: String,
            surname: String,
            homebase: String,
            #[serde(rename = "typeRatings")]
            type_ratings: Vec<String>,
        }
        #[derive(Deserialize)]
        struct RawRoster {
            pilots: Vec<RawPilot>,
            cabincrew: Vec<RawCabinCrew>,
        }
        let raw: RawRoster = serde_json::from_str(data)?;

        let (new_pilots, new_cabin) = (raw.pilots.len(), raw.cabincrew.len());
        self.pilots.extend(raw.pilots.into_iter().map(|p| Pilot {
            forename: p.forename,
            surname: p.surname,
            home_base: p.homebase,
            rank: Rank::from_label(&p.rank),
            type_ratings: p.type_ratings.into_iter().collect(),
        }));
        self.cabin_crew.extend(raw.cabincrew.into_iter().map(|c| CabinCrew {
            forename: c.forename,
            surname: c.surname,
            home_base: c.homebase,
            type_ratings: c.type_ratings.into_iter().collect(),
        }));
        log::info!("{} pilots and {} cabin crew loaded", new_pilots, new_cabin);
        Ok(())
    }

    pub fn find_cabin_crew_by_home_base(&self, airport_code: &str) -> Vec<&CabinCrew> {
        self.cabin_crew
            .iter()
            .filter(|c| c.home_base.eq_ignore_ascii_case(airport_code))
            .collect()
    }

    pub fn find_cabin_crew_by_home_base_and_type_rating(
        &self,
        type_code: &str,
        airport_code: &str,
    ) -> Vec<&CabinCrew> {
        self.cabin_crew
            .iter()
            .filter(|c| c.home_base == airport_code && c.has_rating(type_code))
            .collect()
    }

    pub fn find_cabin_crew_by_type_rating(&self, type_code: &str) -> Vec<&CabinCrew> {
        self.cabin_crew.iter().filter(|c| c.has_rating(type_code)).collect()
    }

    pub fn find_pilots_by_home_base(&self, airport_code: &str) -> Vec<&Pilot> {
        self.pilots.iter().filter(|p| p.home_base == airport_code).collect()
    }

    pub fn find_pilots_by_home_base_and_type_rating(
        &self,
        type_code: &str,
        airport_code: &str,
    ) -> Vec<&Pilot> {
        self.pilots
            .iter()
            .filter(|p| p.home_base == airport_code && p.has_rating(type_code))
            .collect()
    }

    pub fn find_pilots_by_type_rating(&self, type_code: &str) -> Vec<&Pilot> {
        self.pilots.iter().filter(|p| p.has_rating(type_code)).collect()
    }

    pub fn all_pilots(&self) -> &[Pilot] {
        &self.pilots
    }

    pub fn all_cabin_crew(&self) -> &[CabinCrew] {
        &self.cabin_crew
    }

    /// Everyone on the roster, cabin crew first, as the shared capability.
    pub fn all_crew(&self) -> Vec<&dyn CrewMember> {
        self.cabin_crew
            .iter()
            .map(|c| c as &dyn CrewMember)
            .chain(self.pilots.iter().map(|p| p as &dyn CrewMember))
            .collect()
    }

    pub fn pilot_count(&self) -> usize {
        self.pilots.len()
    }

    pub fn cabin_crew_count(&self) -> usize {
        self.cabin_crew.len()
    }

    pub fn count(&self) -> usize {
        self.pilots.len() + self.cabin_crew.len()
    }

    pub fn reset(&mut self) {
        self.pilots.clear();
        self.cabin_crew.clear();
    }
}
