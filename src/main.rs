use crate::aircraft::{Aircraft, AircraftStore};
use crate::crew::{CabinCrew, CrewMember, CrewStore, Pilot};
use crate::error::DataLoadError;
use crate::passengers::PassengerNumbersStore;
use crate::routes::{Route, RouteStore};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tabled::settings::Style;
use tabled::Tabled;

mod aircraft;
mod crew;
mod error;
mod passengers;
mod routes;

#[derive(Parser)]
struct Args {
    /// Path to the aircraft fleet CSV
    #[arg(long, value_name = "FILE", default_value = "data/aircraft.csv")]
    aircraft: PathBuf,
    /// Path to the crew roster JSON
    #[arg(long, value_name = "FILE", default_value = "data/crew.json")]
    crew: PathBuf,
    /// Path to the route timetable XML
    #[arg(long, value_name = "FILE", default_value = "data/routes.xml")]
    routes: PathBuf,
    /// Path to the passenger numbers SQLite database. No sample database
    /// ships with the repo; without one the store starts empty and the
    /// startup load failure can be ignored.
    #[arg(long, value_name = "FILE", default_value = "data/passengernumbers.db")]
    passengers: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

#[derive(Tabled)]
struct AircraftRow {
    tail: String,
    type_code: String,
    manufacturer: String,
    model: String,
    seats: u32,
    crew: u32,
    position: String,
}

impl From<&Aircraft> for AircraftRow {
    fn from(a: &Aircraft) -> AircraftRow {
        AircraftRow {
            tail: a.tail_code.clone(),
            type_code: a.type_code.clone(),
            manufacturer: a.manufacturer.to_string(),
            model: a.model.clone(),
            seats: a.seats,
            crew: a.cabin_crew_required,
            position: a.starting_position.clone(),
        }
    }
}

#[derive(Tabled)]
struct CrewRow {
    name: String,
    role: String,
    base: String,
    ratings: String,
}

impl CrewRow {
    fn new(member: &dyn CrewMember, role: String) -> CrewRow {
        let mut ratings: Vec<&str> = member.type_ratings().iter().map(String::as_str).collect();
        ratings.sort_unstable();
        CrewRow {
            name: member.full_name(),
            role,
            base: member.home_base().to_string(),
            ratings: ratings.join(" "),
        }
    }
}

impl From<&Pilot> for CrewRow {
    fn from(p: &Pilot) -> CrewRow {
        CrewRow::new(p, p.rank.to_string())
    }
}

impl From<&CabinCrew> for CrewRow {
    fn from(c: &CabinCrew) -> CrewRow {
        CrewRow::new(c, "Cabin Crew".to_string())
    }
}

#[derive(Tabled)]
struct RouteRow {
    flight: u32,
    day: String,
    from: String,
    to: String,
    departs: String,
    arrives: String,
    minutes: i64,
}

impl From<&Route> for RouteRow {
    fn from(r: &Route) -> RouteRow {
        RouteRow {
            flight: r.flight_number,
            day: r.day_of_week.clone(),
            from: r.departure_airport_code.clone(),
            to: r.arrival_airport_code.clone(),
            departs: r.departure_time.format("%H:%M").to_string(),
            arrives: r.arrival_time.format("%H:%M").to_string(),
            minutes: r.duration.num_minutes(),
        }
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn show_table<R: Tabled>(rows: Vec<R>) {
    if rows.is_empty() {
        println!("No matching entries found.");
        return;
    }
    let count = rows.len();
    let mut table = tabled::Table::new(rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if count > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn report_load(what: &str, path: &Path, result: Result<(), DataLoadError>) {
    match result {
        Ok(()) => println!("Loaded {} from {}", what, path.display()),
        Err(e) => {
            log::error!("loading {} failed: {}", what, e);
            println!("{}", format!("Could not load {}: {}", what, e).red());
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            println!("{}", "Dates are YYYY-MM-DD.".red());
            None
        }
    }
}

// "base MAN rating B738" -> per-key lookups for the crew queries
fn keyed<'a>(parts: &[&'a str], key: &str) -> Option<&'a str> {
    parts
        .windows(2)
        .find(|w| w[0] == key)
        .map(|w| w[1])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut aircraft = AircraftStore::new();
    let mut crew = CrewStore::new();
    let mut routes = RouteStore::new();
    let mut passengers = PassengerNumbersStore::new();

    report_load("aircraft", &args.aircraft, aircraft.load(&args.aircraft));
    report_load("crew", &args.crew, crew.load(&args.crew));
    report_load("routes", &args.routes, routes.load(&args.routes));
    report_load("passenger numbers", &args.passengers, passengers.load(&args.passengers));

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "aircraft".to_string(),
            "pilots".to_string(),
            "cabincrew".to_string(),
            "crew".to_string(),
            "routes".to_string(),
            "pax".to_string(),
            "counts".to_string(),
            "load".to_string(),
            "reset".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "aircraft" => {
                        let found: Vec<&Aircraft> = match (parts.get(1), parts.get(2)) {
                            (Some(&"seats"), Some(n)) => match n.parse() {
                                Ok(min) => aircraft.find_by_seats(min),
                                Err(_) => {
                                    println!("Usage: aircraft seats <number>");
                                    continue;
                                }
                            },
                            (Some(&"at"), Some(code)) => aircraft.find_by_starting_position(code),
                            (Some(&"tail"), Some(code)) => {
                                aircraft.find_by_tail_code(code).into_iter().collect()
                            }
                            (Some(&"type"), Some(code)) => aircraft.find_by_type(code),
                            (None, _) => aircraft.all().iter().collect(),
                            _ => {
                                println!("Usage: aircraft [seats <n> | at <code> | tail <code> | type <code>]");
                                continue;
                            }
                        };
                        show_table(found.into_iter().map(AircraftRow::from).collect());
                    },
                    "pilots" => {
                        let base = keyed(&parts, "base");
                        let rating = keyed(&parts, "rating");
                        let found: Vec<&Pilot> = match (base, rating) {
                            (Some(b), Some(t)) => crew.find_pilots_by_home_base_and_type_rating(t, b),
                            (Some(b), None) => crew.find_pilots_by_home_base(b),
                            (None, Some(t)) => crew.find_pilots_by_type_rating(t),
                            (None, None) => crew.all_pilots().iter().collect(),
                        };
                        show_table(found.into_iter().map(CrewRow::from).collect());
                    },
                    "cabincrew" => {
                        let base = keyed(&parts, "base");
                        let rating = keyed(&parts, "rating");
                        let found: Vec<&CabinCrew> = match (base, rating) {
                            (Some(b), Some(t)) => crew.find_cabin_crew_by_home_base_and_type_rating(t, b),
                            (Some(b), None) => crew.find_cabin_crew_by_home_base(b),
                            (None, Some(t)) => crew.find_cabin_crew_by_type_rating(t),
                            (None, None) => crew.all_cabin_crew().iter().collect(),
                        };
                        show_table(found.into_iter().map(CrewRow::from).collect());
                    },
                    "crew" => {
                        let rows: Vec<CrewRow> = crew
                            .all_crew()
                            .into_iter()
                            .map(|m| CrewRow::new(m, "-".to_string()))
                            .collect();
                        show_table(rows);
                    },
                    "routes" => {
                        let found: Vec<&Route> = match (parts.get(1), parts.get(2)) {
                            (Some(&"day"), Some(day)) => routes.find_by_day_of_week(day),
                            (Some(&"from"), Some(code)) => match parts.get(4) {
                                Some(day) if parts.get(3) == Some(&"day") => {
                                    routes.find_by_departure_airport_and_day(code, day)
                                }
                                _ => routes.find_departing_airport(code),
                            },
                            (Some(&"date"), Some(text)) => match parse_date(text) {
                                Some(date) => routes.find_by_date(date),
                                None => continue,
                            },
                            (None, _) => routes.all().iter().collect(),
                            _ => {
                                println!("Usage: routes [day <Ddd> | from <code> [day <Ddd>] | date <yyyy-mm-dd>]");
                                continue;
                            }
                        };
                        show_table(found.into_iter().map(RouteRow::from).collect());
                    },
                    "pax" => {
                        if let (Some(flight), Some(date_text)) = (parts.get(1), parts.get(2)) {
                            let Ok(flight) = flight.parse::<u32>() else {
                                println!("Usage: pax <flight_number> <yyyy-mm-dd>");
                                continue;
                            };
                            let Some(date) = parse_date(date_text) else { continue };
                            match passengers.passenger_numbers_for(flight, date) {
                                -1 => println!("No forecast for flight {} on {}.", flight, date),
                                n => println!("Flight {} on {}: {} passengers forecast.", flight, date, n),
                            }
                        } else {
                            println!("Usage: pax <flight_number> <yyyy-mm-dd>");
                        }
                    },
                    "counts" => {
                        println!("aircraft: {}", aircraft.count());
                        println!("pilots: {}  cabin crew: {}", crew.pilot_count(), crew.cabin_crew_count());
                        println!("routes: {}", routes.count());
                        println!("passenger forecasts: {}", passengers.count());
                    },
                    "load" => {
                        if let (Some(which), Some(path)) = (parts.get(1), parts.get(2)) {
                            let path = Path::new(path);
                            match *which {
                                "aircraft" => report_load("aircraft", path, aircraft.load(path)),
                                "crew" => report_load("crew", path, crew.load(path)),
                                "routes" => report_load("routes", path, routes.load(path)),
                                "pax" => report_load("passenger numbers", path, passengers.load(path)),
                                _ => println!("Usage: load <aircraft|crew|routes|pax> <path>"),
                            }
                        } else {
                            println!("Usage: load <aircraft|crew|routes|pax> <path>");
                        }
                    },
                    "reset" => {
                        match parts.get(1).copied().unwrap_or("all") {
                            "aircraft" => aircraft.reset(),
                            "crew" => crew.reset(),
                            "routes" => routes.reset(),
                            "pax" => passengers.reset(),
                            "all" => {
                                aircraft.reset();
                                crew.reset();
                                routes.reset();
                                passengers.reset();
                            },
                            _ => {
                                println!("Usage: reset [aircraft|crew|routes|pax|all]");
                                continue;
                            }
                        }
                        println!("Reset complete.");
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  aircraft [seats <n> | at <code> | tail <code> | type <code>]");
                        println!("  pilots [base <code>] [rating <type>]");
                        println!("  cabincrew [base <code>] [rating <type>]");
                        println!("  crew                          - Everyone on the roster");
                        println!("  routes [day <Ddd> | from <code> [day <Ddd>] | date <yyyy-mm-dd>]");
                        println!("  pax <flight> <yyyy-mm-dd>     - Forecast passenger numbers");
                        println!("  counts                        - Entry counts per store");
                        println!("  load <store> <path>           - Load more data (cumulative)");
                        println!("  reset [store|all]             - Clear loaded data");
                        println!("  help / ?                      - Show this help menu");
                        println!("  exit / quit                   - Leave the console\n");
                    },
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
