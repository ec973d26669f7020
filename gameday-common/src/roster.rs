use crate::game::Game;
use core::time::Duration;
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server answered {0}")]
    Status(StatusCode),
    #[error("Schedule is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Schedule is not a JSON array of games")]
    NotAnArray,
    #[error("Game #{index} is malformed: {reason}")]
    Entry { index: usize, reason: String },
}

/// Where the schedule is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterSource {
    File(PathBuf),
    Url(String),
}

impl FromStr for RosterSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for RosterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// The games of one schedule, in published order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    games: Vec<Game>,
}

impl Roster {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Parses a JSON array of games. A single malformed entry fails the
    /// whole schedule, naming the entry's index.
    pub fn from_json(body: &str) -> Result<Self, RosterError> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Array(entries) = value else {
            return Err(RosterError::NotAnArray);
        };

        let games = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<Game>(entry).map_err(|e| RosterError::Entry {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { games })
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn into_games(self) -> Vec<Game> {
        self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Splits off the last `pinned` games (or all of them, if there are fewer)
    pub fn split_pinned(&self, pinned: usize) -> (&[Game], &[Game]) {
        self.games.split_at(pinned_split(self.games.len(), pinned))
    }
}

/// Index at which the trailing pinned section starts
pub(crate) fn pinned_split(len: usize, pinned: usize) -> usize {
    len.saturating_sub(pinned)
}

/// Progress of loading something that can fail visibly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadStatus<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(t) => Some(t),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(t) => Some(t),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LoadStatus<U> {
        match self {
            Self::Loading => LoadStatus::Loading,
            Self::Loaded(t) => LoadStatus::Loaded(f(t)),
            Self::Failed(reason) => LoadStatus::Failed(reason),
        }
    }
}

pub type RosterStatus = LoadStatus<Roster>;

impl From<Result<Roster, RosterError>> for RosterStatus {
    fn from(result: Result<Roster, RosterError>) -> Self {
        match result {
            Ok(roster) => Self::Loaded(roster),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

pub struct RosterLoader {
    client: Client,
}

impl RosterLoader {
    pub fn new(timeout: Duration) -> Result<Self, RosterError> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn load(
        &self,
        source: &RosterSource,
    ) -> impl std::future::Future<Output = Result<Roster, RosterError>> + use<> {
        let fetch = match source {
            RosterSource::Url(url) => Fetch::Http(self.client.get(url).send()),
            RosterSource::File(path) => Fetch::File(path.clone()),
        };
        let description = source.to_string();

        async move {
            info!("Loading schedule from {description}");
            let body = match fetch {
                Fetch::Http(request) => {
                    let response = request.await?;
                    if response.status() != StatusCode::OK {
                        warn!("Schedule request failed, response: {response:?}");
                        return Err(RosterError::Status(response.status()));
                    }
                    response.text().await?
                }
                Fetch::File(path) => tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| RosterError::Io { path, source })?,
            };

            let roster = Roster::from_json(&body)?;
            debug!("Loaded {} games from {description}", roster.len());
            Ok(roster)
        }
    }
}

enum Fetch<F> {
    Http(F),
    File(PathBuf),
}
