use crate::error::DataLoadError;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub flight_number: u32,
    pub day_of_week: String,
    pub departure_airport: String,
    pub departure_airport_code: String,
    pub arrival_airport: String,
    pub arrival_airport_code: String,
    pub duration: Duration,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
}

/// Parses the PnDTnHnMnS duration shape the timetable uses. Returns None on
/// anything else; the loader wraps that into the load failure.
fn parse_iso_duration(text: &str) -> Option<Duration> {
    let body = text.strip_prefix('P')?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => (d, t),
        None => (body, ""),
    };

    let mut seconds: i64 = 0;
    let mut seen = false;
    let mut accumulate = |part: &str, units: &[(char, i64)]| -> Option<()> {
        let mut number = String::new();
        for ch in part.chars() {
            if ch.is_ascii_digit() {
                number.push(ch);
            } else {
                let scale = units.iter().find(|(u, _)| *u == ch)?.1;
                seconds += number.parse::<i64>().ok()? * scale;
                number.clear();
                seen = true;
            }
        }
        if number.is_empty() { Some(()) } else { None }
    };

    accumulate(date_part, &[('D', 86_400)])?;
    accumulate(time_part, &[('H', 3_600), ('M', 60), ('S', 1)])?;
    if seen { Some(Duration::seconds(seconds)) } else { None }
}

fn parse_local_time(text: &str) -> Result<NaiveTime, DataLoadError> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|source| DataLoadError::BadTime { text: text.to_string(), source })
}

/// Renders a calendar date as the fixed English three-letter weekday
/// abbreviation the timetable uses ("Mon".."Sun").
pub fn weekday_abbrev(date: NaiveDate) -> String {
    // chrono's Weekday Display is exactly this abbreviation, locale-free.
    date.weekday().to_string()
}

#[derive(Default)]
pub struct RouteStore {
    routes: Vec<Route>,
}

impl RouteStore {
    pub fn new() -> RouteStore {
        RouteStore { routes: Vec::new() }
    }

    /// Loads a timetable document, appending to the routes already held.
    /// Each `Route` element is appended as it parses; a bad element aborts
    /// the call but earlier elements from the same call are kept.
    pub fn load(&mut self, path: &Path) -> Result<(), DataLoadError> {
        let data = std::fs::read_to_string(path)?;
        self.load_str(&data)
    }

    pub fn load_str(&mut self, data: &str) -> Result<(), DataLoadError> {
        let before = self.routes.len();
        let doc = roxmltree::Document::parse(data)?;
        for (index, node) in doc
            .descendants()
            .filter(|n| n.is_element() && n.has_tag_name("Route"))
            .enumerate()
        {
            let child = |name: &'static str| {
                node.children()
                    .find(|c| c.has_tag_name(name))
                    .and_then(|c| c.text())
                    .map(str::trim)
                    .ok_or(DataLoadError::MissingElement { index, name })
            };

            let flight_text = child("FlightNumber")?;
            let flight_number = flight_text.parse().map_err(|source| {
                DataLoadError::BadNumber { field: "FlightNumber", source }
            })?;
            let duration_text = child("Duration")?;
            let duration = parse_iso_duration(duration_text)
                .ok_or_else(|| DataLoadError::BadDuration(duration_text.to_string()))?;

            let route = Route {
                flight_number,
                day_of_week: child("DayOfWeek")?.to_string(),
                departure_airport: child("DepartureAirport")?.to_string(),
                departure_airport_code: child("DepartureAirportCode")?.to_string(),
                arrival_airport: child("ArrivalAirport")?.to_string(),
                arrival_airport_code: child("ArrivalAirportCode")?.to_string(),
                duration,
                departure_time: parse_local_time(child("DepartureTime")?)?,
                arrival_time: parse_local_time(child("ArrivalTime")?)?,
            };
            log::debug!("route {} {} on {}", route.flight_number, route.departure_airport_code, route.day_of_week);
            self.routes.push(route);
        }
        log::info!("{} routes loaded, {} held", self.routes.len() - before, self.routes.len());
        Ok(())
    }

    pub fn find_by_day_of_week(&self, day_of_week: &str) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.day_of_week == day_of_week).collect()
    }

    pub fn find_departing_airport(&self, airport_code: &str) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|r| r.departure_airport_code == airport_code)
            .collect()
    }

    pub fn find_by_departure_airport_and_day(
        &self,
        airport_code: &str,
        day_of_week: &str,
    ) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|r| r.departure_airport_code == airport_code && r.day_of_week == day_of_week)
            .collect()
    }

    /// Routes departing on the weekday this date falls on.
    pub fn find_by_date(&self, date: NaiveDate) -> Vec<&Route> {
        self.find_by_day_of_week(&weekday_abbrev(date))
    }

    pub fn all(&self) -> &[Route] {
        &self.routes
    }

    pub fn count(&self) -> usize {
        self.routes.len()
    }

    pub fn reset(&mut self) {
        self.routes.clear();
    }
}
