use crate::{
    card::{Card, CardState, Ticket},
    predict::{BatchPrediction, PredictError, PredictionResponse},
    roster::{Roster, pinned_split},
};
use log::{debug, info, warn};

/// Every card of a schedule, in schedule order.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    team: String,
    cards: Vec<Card>,
    pinned: usize,
}

impl Board {
    pub fn new(team: &str, roster: Roster, pinned: usize) -> Self {
        Self {
            team: team.to_string(),
            cards: roster.into_games().into_iter().map(Card::new).collect(),
            pinned,
        }
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Index of the first card of the pinned section at the end of the board
    pub fn pinned_start(&self) -> usize {
        pinned_split(self.cards.len(), self.pinned)
    }

    pub fn sections(&self) -> (&[Card], &[Card]) {
        self.cards.split_at(self.pinned_start())
    }

    /// Number of cards still waiting on a prediction
    pub fn in_flight(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state() == CardState::Awaiting)
            .count()
    }

    pub fn request(&mut self, index: usize) -> Option<Ticket> {
        let card = self.cards.get_mut(index)?;
        let ticket = card.begin(index);
        debug!(
            "Prediction requested for {} (generation {})",
            card.game().opponent,
            ticket.generation()
        );
        Some(ticket)
    }

    pub fn request_all(&mut self) -> Vec<Ticket> {
        (0..self.cards.len())
            .filter_map(|index| self.request(index))
            .collect()
    }

    /// Applies a settled prediction. Returns `false` if the ticket was stale
    /// or does not belong to this board.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<PredictionResponse, PredictError>,
    ) -> bool {
        match self.cards.get_mut(ticket.card()) {
            Some(card) => {
                let applied = card.settle(ticket, &result, &self.team);
                if let (true, Err(e)) = (applied, &result) {
                    warn!("Prediction failed: {e}");
                }
                applied
            }
            None => {
                warn!("Got a prediction for card {}, which doesn't exist", ticket.card());
                false
            }
        }
    }

    /// Settles each ticket from the service's whole-schedule answer. Cards
    /// the answer does not cover settle as failed. Returns how many tickets
    /// were applied.
    pub fn settle_batch(
        &mut self,
        tickets: &[Ticket],
        batch: Result<Vec<BatchPrediction>, PredictError>,
    ) -> usize {
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Batch prediction failed: {e}");
                let reason = e.to_string();
                let mut applied = 0;
                for ticket in tickets {
                    let result = Err(PredictError::BatchFailed(reason.clone()));
                    if let Some(card) = self.cards.get_mut(ticket.card()) {
                        if card.settle(*ticket, &result, &self.team) {
                            applied += 1;
                        }
                    }
                }
                return applied;
            }
        };

        let mut applied = 0;
        for ticket in tickets {
            let Some(card) = self.cards.get_mut(ticket.card()) else {
                continue;
            };
            let result = match batch.iter().find(|p| p.matches(card.game())) {
                Some(prediction) => Ok(prediction.response()),
                None => {
                    let game = card.game();
                    let e = PredictError::MissingFromBatch {
                        date: game.date_string(),
                        opponent: game.opponent.clone(),
                    };
                    warn!("{e}");
                    Err(e)
                }
            };
            if card.settle(*ticket, &result, &self.team) {
                applied += 1;
            }
        }

        let unmatched = batch
            .iter()
            .filter(|p| !self.cards.iter().any(|c| p.matches(c.game())))
            .count();
        if unmatched > 0 {
            info!("{unmatched} batch predictions matched no game on the board");
        }

        applied
    }
}
