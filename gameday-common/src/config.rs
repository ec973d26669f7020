use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub season: u16,
}

impl Default for Team {
    fn default() -> Self {
        Self {
            name: "Patriots".to_string(),
            season: 2025,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// A file path or an `http(s)://` URL pointing at a JSON array of games
    pub location: String,
    /// Number of trailing games shown in their own section at the bottom
    pub pinned_count: usize,
    pub timeout_secs: u64,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            location: "games.json".to_string(),
            pinned_count: 2,
            timeout_secs: 10,
        }
    }
}

impl Roster {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
pub enum PredictionMode {
    #[derivative(Default)]
    Service,
    Mock,
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "Service"),
            Self::Mock => write!(f, "Mock"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub mode: PredictionMode,
    pub url: String,
    pub require_https: bool,
    pub timeout_secs: u64,
}

impl Default for Prediction {
    fn default() -> Self {
        Self {
            mode: PredictionMode::Service,
            url: "http://127.0.0.1:5000".to_string(),
            require_https: false,
            timeout_secs: 10,
        }
    }
}

impl Prediction {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub team: Team,
    pub roster: Roster,
    pub prediction: Prediction,
}
