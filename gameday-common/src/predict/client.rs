use super::{PredictError, PredictionResponse};
use crate::{game::Game, teams::same_team};
use core::time::Duration;
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;

/// Client for the external prediction service.
pub struct PredictionClient {
    base_url: String,
    client: Client,
}

impl PredictionClient {
    pub fn new(base_url: &str, require_https: bool, timeout: Duration) -> Result<Self, PredictError> {
        let client = ClientBuilder::new()
            .https_only(require_https)
            .timeout(timeout)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn predict(
        &self,
        game: &Game,
    ) -> impl std::future::Future<Output = Result<PredictionResponse, PredictError>> + use<> {
        let url = format!("{}/predict", self.base_url);

        let request = self.client.post(&url).json(game).send();
        let opponent = game.opponent.clone();

        async move {
            let response = request.await?;

            if response.status().is_success() {
                let body = response.text().await?;
                let parsed: PredictionResponse = serde_json::from_str(&body)?;
                debug!("Prediction for {opponent}: {parsed:?}");
                Ok(parsed)
            } else {
                warn!("Prediction request failed, response: {:?}", response);
                Err(status_error(response).await)
            }
        }
    }

    /// Asks the service for every game of its own schedule at once.
    pub fn predict_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<BatchPrediction>, PredictError>> + use<> {
        let url = format!("{}/predict_all", self.base_url);

        let request = self.client.get(&url).send();

        async move {
            let response = request.await?;

            if response.status().is_success() {
                let body = response.text().await?;
                let parsed: Vec<BatchPrediction> = serde_json::from_str(&body)?;
                info!("Received {} batch predictions", parsed.len());
                Ok(parsed)
            } else {
                warn!("Batch prediction request failed, response: {:?}", response);
                Err(status_error(response).await)
            }
        }
    }
}

/// Turns an unsuccessful response into an error, using the service's
/// `{"error": "..."}` body as the reason when there is one.
async fn status_error(response: reqwest::Response) -> PredictError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = error_reason(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    });
    PredictError::Status { status, reason }
}

fn error_reason(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(parsed.error);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One entry of the service's whole-schedule answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchPrediction {
    pub date: String,
    pub opponent: String,
    pub prediction: String,
    pub confidence: f64,
}

impl BatchPrediction {
    /// The service names opponents by league code, schedules usually by
    /// nickname. Either spelling matches.
    pub fn matches(&self, game: &Game) -> bool {
        self.date == game.date_string() && same_team(&self.opponent, &game.opponent)
    }

    pub fn response(&self) -> PredictionResponse {
        PredictionResponse {
            result: self.prediction.clone(),
            confidence: self.confidence,
        }
    }
}
