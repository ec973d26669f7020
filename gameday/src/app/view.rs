use gameday_common::{
    board::Board,
    card::{Card, CardState},
    roster::LoadStatus,
};
use std::fmt::Write;

pub const LOADING_TEXT: &str = "Loading schedule...";
pub const PINNED_HEADING: &str = "-- Season finale --";

const AWAITING_TEXT: &str = "Predicting...";
const IDLE_TEXT: &str = "No prediction yet";

/// The whole page: title, then one block per card, main section first.
pub fn page(title: &str, status: &LoadStatus<Board>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out);

    let board = match status {
        LoadStatus::Loading => {
            let _ = writeln!(out, "{LOADING_TEXT}");
            return out;
        }
        LoadStatus::Failed(reason) => {
            let _ = writeln!(out, "Could not load the schedule: {reason}");
            return out;
        }
        LoadStatus::Loaded(board) => board,
    };

    if board.is_empty() {
        let _ = writeln!(out, "No games scheduled");
        return out;
    }

    let (main, pinned) = board.sections();
    for (index, card) in main.iter().enumerate() {
        out.push_str(&card_block(index + 1, card));
        out.push('\n');
    }
    if !pinned.is_empty() {
        let _ = writeln!(out, "{PINNED_HEADING}");
        let _ = writeln!(out);
        for (offset, card) in pinned.iter().enumerate() {
            out.push_str(&card_block(main.len() + offset + 1, card));
            out.push('\n');
        }
    }
    out
}

/// One card, numbered from 1 the way the menu numbers it
pub fn card_block(number: usize, card: &Card) -> String {
    let game = card.game();
    let mut out = String::new();
    let _ = writeln!(out, "{number:>2}. {}", game.opponent);
    let _ = writeln!(out, "    {} - {}", game.date_string(), game.kickoff());
    let _ = writeln!(out, "    {}", game.location);
    let _ = writeln!(out, "    {}", prediction_line(card));
    out
}

pub fn prediction_line(card: &Card) -> String {
    match (card.state(), card.display()) {
        (CardState::Awaiting, Some(previous)) => format!("{previous} ({AWAITING_TEXT})"),
        (CardState::Awaiting, None) => AWAITING_TEXT.to_string(),
        (_, Some(text)) => text.to_string(),
        (_, None) => IDLE_TEXT.to_string(),
    }
}

/// Short label used in the menu
pub fn card_label(number: usize, card: &Card) -> String {
    let game = card.game();
    format!(
        "{number}. {} {} {} ({})",
        game.date_string(),
        match game.location.is_home() {
            true => "vs",
            false => "at",
        },
        game.opponent,
        game.kickoff()
    )
}
