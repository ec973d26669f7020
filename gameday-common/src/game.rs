use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");
const TIME_FORMAT_SECS: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second]");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("Unknown location {0:?}, expected \"home\" or \"away\"")]
    InvalidLocation(String),
    #[error("Missing location, expected a `location` or `home` field")]
    MissingLocation,
    #[error("The opponent name is empty")]
    EmptyOpponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub fn from_home_flag(home: bool) -> Self {
        if home { Self::Home } else { Self::Away }
    }

    pub fn is_home(self) -> bool {
        self == Self::Home
    }

    fn as_wire_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
        }
    }
}

impl FromStr for Location {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            _ => Err(GameError::InvalidLocation(s.to_string())),
        }
    }
}

/// One scheduled game of the followed team.
///
/// Schedules have been published with two shapes: one with a boolean `home`
/// flag and a nullable `time`, and one with a `location` string. Both are
/// accepted when reading. Serializing always writes `location` together with
/// the matching `home` flag, so either shape of consumer reads the venue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawGame")]
pub struct Game {
    pub date: Date,
    pub opponent: String,
    pub location: Location,
    /// `None` when the kickoff time has not been announced yet
    pub time: Option<Time>,
}

impl Game {
    pub fn new(date: Date, opponent: &str, location: Location, time: Option<Time>) -> Self {
        Self {
            date,
            opponent: opponent.to_string(),
            location,
            time,
        }
    }

    pub fn date_string(&self) -> String {
        format!(
            "{}-{:02}-{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day()
        )
    }

    pub fn time_string(&self) -> Option<String> {
        self.time
            .map(|t| format!("{:02}:{:02}", t.hour(), t.minute()))
    }

    /// The kickoff time, or `TBD` if it is unknown
    pub fn kickoff(&self) -> String {
        self.time_string().unwrap_or_else(|| "TBD".to_string())
    }
}

#[derive(Deserialize)]
struct RawGame {
    date: String,
    opponent: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    home: Option<bool>,
    #[serde(default)]
    time: Option<String>,
}

impl TryFrom<RawGame> for Game {
    type Error = GameError;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        let date = Date::parse(raw.date.trim(), DATE_FORMAT)
            .map_err(|_| GameError::InvalidDate(raw.date.clone()))?;

        let opponent = raw.opponent.trim();
        if opponent.is_empty() {
            return Err(GameError::EmptyOpponent);
        }

        let location = match (raw.location, raw.home) {
            (Some(location), _) => location.parse()?,
            (None, Some(home)) => Location::from_home_flag(home),
            (None, None) => return Err(GameError::MissingLocation),
        };

        let time = match raw.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(time) => Some(parse_time(time)?),
        };

        Ok(Self {
            date,
            opponent: opponent.to_string(),
            location,
            time,
        })
    }
}

fn parse_time(time: &str) -> Result<Time, GameError> {
    Time::parse(time, TIME_FORMAT)
        .or_else(|_| Time::parse(time, TIME_FORMAT_SECS))
        .map_err(|_| GameError::InvalidTime(time.to_string()))
}

#[derive(Serialize)]
struct WireGame<'a> {
    date: String,
    opponent: &'a str,
    location: &'static str,
    home: bool,
    time: Option<String>,
}

impl Serialize for Game {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireGame {
            date: self.date_string(),
            opponent: &self.opponent,
            location: self.location.as_wire_str(),
            home: self.location.is_home(),
            time: self.time_string(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn test_deserialize_location_schema() {
        let game: Game = serde_json::from_str(
            r#"{"date":"2025-09-07","opponent":"Jets","location":"home","time":"13:00"}"#,
        )
        .unwrap();
        assert_eq!(
            game,
            Game::new(date!(2025 - 09 - 07), "Jets", Location::Home, Some(time!(13:00)))
        );
    }

    #[test]
    fn test_deserialize_home_flag_schema() {
        let game: Game = serde_json::from_str(
            r#"{"date":"2025-10-12","opponent":"Saints","home":false,"time":null}"#,
        )
        .unwrap();
        assert_eq!(
            game,
            Game::new(date!(2025 - 10 - 12), "Saints", Location::Away, None)
        );
        assert_eq!(game.kickoff(), "TBD");
    }

    #[test]
    fn test_location_field_wins_over_home_flag() {
        let game: Game = serde_json::from_str(
            r#"{"date":"2025-10-12","opponent":"Saints","location":"Away","home":true}"#,
        )
        .unwrap();
        assert_eq!(game.location, Location::Away);
        assert_eq!(game.time, None);
    }

    #[test]
    fn test_time_variants() {
        let game: Game = serde_json::from_str(
            r#"{"date":"2025-10-12","opponent":"Bills","home":true,"time":"20:20:00"}"#,
        )
        .unwrap();
        assert_eq!(game.time, Some(time!(20:20)));

        let game: Game = serde_json::from_str(
            r#"{"date":"2025-10-12","opponent":"Bills","home":true,"time":""}"#,
        )
        .unwrap();
        assert_eq!(game.time, None);
    }

    #[test]
    fn test_reject_malformed() {
        let missing_location = r#"{"date":"2025-10-12","opponent":"Bills"}"#;
        let err = serde_json::from_str::<Game>(missing_location).unwrap_err();
        assert!(err.to_string().contains("Missing location"));

        let bad_date = r#"{"date":"10/12/2025","opponent":"Bills","home":true}"#;
        let err = serde_json::from_str::<Game>(bad_date).unwrap_err();
        assert!(err.to_string().contains("Invalid date"));

        let bad_location = r#"{"date":"2025-10-12","opponent":"Bills","location":"neutral"}"#;
        let err = serde_json::from_str::<Game>(bad_location).unwrap_err();
        assert!(err.to_string().contains("Unknown location"));

        let bad_time = r#"{"date":"2025-10-12","opponent":"Bills","home":true,"time":"1pm"}"#;
        let err = serde_json::from_str::<Game>(bad_time).unwrap_err();
        assert!(err.to_string().contains("Invalid time"));

        let no_opponent = r#"{"date":"2025-10-12","opponent":"  ","home":true}"#;
        let err = serde_json::from_str::<Game>(no_opponent).unwrap_err();
        assert!(err.to_string().contains("opponent"));
    }

    #[test]
    fn test_serialize_request_body() {
        let game = Game::new(date!(2025 - 09 - 07), "Jets", Location::Home, Some(time!(13:00)));
        assert_eq!(
            serde_json::to_string(&game).unwrap(),
            r#"{"date":"2025-09-07","opponent":"Jets","location":"home","home":true,"time":"13:00"}"#
        );

        let game = Game::new(date!(2025 - 11 - 02), "Falcons", Location::Away, None);
        assert_eq!(
            serde_json::to_string(&game).unwrap(),
            r#"{"date":"2025-11-02","opponent":"Falcons","location":"away","home":false,"time":null}"#
        );
    }
}
