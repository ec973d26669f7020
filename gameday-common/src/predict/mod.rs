use crate::{
    config::{Prediction as PredictionConfig, PredictionMode},
    game::Game,
};
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future, pin::Pin};
use thiserror::Error;

mod client;
mod mock;

pub use client::{BatchPrediction, PredictionClient};
pub use mock::MockPredictor;

/// Shown on a card for every kind of failed prediction
pub const UNAVAILABLE_MESSAGE: &str = "Prediction service unavailable. Try again.";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service answered {status}: {reason}")]
    Status { status: StatusCode, reason: String },
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Batch prediction failed: {0}")]
    BatchFailed(String),
    #[error("No prediction for the game against {opponent} on {date}")]
    MissingFromBatch { date: String, opponent: String },
    #[error("{0} is not available in mock mode")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    /// A draw strictly above one half is a win
    pub fn from_draw(draw: f64) -> Self {
        if draw > 0.5 { Self::Win } else { Self::Lose }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "WIN"),
            Self::Lose => write!(f, "LOSE"),
        }
    }
}

/// The service's answer. `result` is shown verbatim, whatever its spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub result: String,
    pub confidence: f64,
}

impl PredictionResponse {
    pub fn new(outcome: Outcome, confidence: f64) -> Self {
        Self {
            result: outcome.to_string(),
            confidence,
        }
    }

    pub fn message(&self, team: &str) -> String {
        format!(
            "{team} will likely {} (Confidence: {}%)",
            self.result,
            percent(self.confidence)
        )
    }
}

/// One decimal of `fraction * 100`. Values exactly halfway between two
/// tenths round away from zero, not to even.
fn percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    // Only quarters can sit exactly halfway between two tenths
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// The text a card shows once its prediction has settled
pub fn settled_message(team: &str, result: &Result<PredictionResponse, PredictError>) -> String {
    match result {
        Ok(response) => response.message(team),
        Err(_) => UNAVAILABLE_MESSAGE.to_string(),
    }
}

pub type PredictionFuture =
    Pin<Box<dyn Future<Output = Result<PredictionResponse, PredictError>> + Send + 'static>>;

/// How a freshly triggered prediction proceeds
pub enum Started {
    /// Already decided, no waiting involved
    Settled(Result<PredictionResponse, PredictError>),
    InFlight(PredictionFuture),
}

impl fmt::Debug for Started {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settled(result) => f.debug_tuple("Settled").field(result).finish(),
            Self::InFlight(_) => f.debug_tuple("InFlight").finish(),
        }
    }
}

pub enum PredictionSource {
    Service(PredictionClient),
    Mock(MockPredictor),
}

impl PredictionSource {
    /// `seed` only applies to the mock, and makes its draws repeatable
    pub fn from_config(config: &PredictionConfig, seed: Option<u64>) -> Result<Self, PredictError> {
        match config.mode {
            PredictionMode::Service => Ok(Self::Service(PredictionClient::new(
                &config.url,
                config.require_https,
                config.timeout(),
            )?)),
            PredictionMode::Mock => Ok(Self::Mock(match seed {
                Some(seed) => MockPredictor::seeded(seed),
                None => MockPredictor::new(),
            })),
        }
    }

    pub fn mode(&self) -> PredictionMode {
        match self {
            Self::Service(_) => PredictionMode::Service,
            Self::Mock(_) => PredictionMode::Mock,
        }
    }

    pub fn start(&self, game: &Game) -> Started {
        match self {
            Self::Service(client) => {
                debug!(
                    "Requesting a prediction for {} on {}",
                    game.opponent,
                    game.date_string()
                );
                Started::InFlight(Box::pin(client.predict(game)))
            }
            Self::Mock(mock) => Started::Settled(Ok(mock.draw())),
        }
    }
}
