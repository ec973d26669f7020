use gameday_common::{
    card::Ticket,
    predict::{BatchPrediction, PredictError, PredictionResponse},
};

/// Results handed back to the app by spawned prediction tasks. `epoch`
/// names the schedule load the request was made against.
#[derive(Debug)]
pub enum Message {
    PredictionSettled {
        epoch: u64,
        ticket: Ticket,
        result: Result<PredictionResponse, PredictError>,
    },
    BatchSettled {
        epoch: u64,
        tickets: Vec<Ticket>,
        result: Result<Vec<BatchPrediction>, PredictError>,
    },
}

impl Message {
    pub fn epoch(&self) -> u64 {
        match self {
            Self::PredictionSettled { epoch, .. } | Self::BatchSettled { epoch, .. } => *epoch,
        }
    }
}
