use crate::{
    game::Game,
    predict::{PredictError, PredictionResponse, settled_message},
};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle,
    Awaiting,
    SettledSuccess,
    SettledError,
}

/// Identifies one prediction request. Only the ticket of a card's most
/// recent request may settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    card: usize,
    generation: u64,
}

impl Ticket {
    pub fn card(&self) -> usize {
        self.card
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One game and the prediction shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    game: Game,
    state: CardState,
    generation: u64,
    display: Option<String>,
}

impl Card {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            state: CardState::Idle,
            generation: 0,
            display: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The settled prediction text. A previous result stays visible while a
    /// newer request is awaited.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub(crate) fn begin(&mut self, index: usize) -> Ticket {
        self.generation += 1;
        self.state = CardState::Awaiting;
        Ticket {
            card: index,
            generation: self.generation,
        }
    }

    /// Returns `false`, leaving the card untouched, for a stale ticket.
    pub(crate) fn settle(
        &mut self,
        ticket: Ticket,
        result: &Result<PredictionResponse, PredictError>,
        team: &str,
    ) -> bool {
        if ticket.generation != self.generation || self.state != CardState::Awaiting {
            debug!(
                "Discarding stale prediction for {} (generation {}, current {})",
                self.game.opponent, ticket.generation, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(_) => CardState::SettledSuccess,
            Err(_) => CardState::SettledError,
        };
        self.display = Some(settled_message(team, result));
        true
    }
}
