use crate::app::{App, view};
use gameday_common::{board::Board, roster::LoadStatus};
use inquire::{InquireError, Select};
use log::*;
use std::{fmt, time::Duration};
use tokio::task;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Predict { index: usize, label: String },
    PredictAll,
    Batch,
    Refresh,
    Reload,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predict { label, .. } => write!(f, "Predict {label}"),
            Self::PredictAll => write!(f, "Predict every game"),
            Self::Batch => write!(f, "Predict every game in one request"),
            Self::Refresh => write!(f, "Refresh"),
            Self::Reload => write!(f, "Reload the schedule"),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

fn choices(status: &LoadStatus<Board>) -> Vec<Choice> {
    let mut choices = Vec::new();
    if let LoadStatus::Loaded(board) = status {
        choices.extend(
            board
                .cards()
                .iter()
                .enumerate()
                .map(|(index, card)| Choice::Predict {
                    index,
                    label: view::card_label(index + 1, card),
                }),
        );
        if !board.is_empty() {
            choices.push(Choice::PredictAll);
            choices.push(Choice::Batch);
        }
    }
    choices.extend([Choice::Refresh, Choice::Reload, Choice::Quit]);
    choices
}

/// Shows the page and a menu until the user quits. After each action the
/// page is redrawn once predictions settle, or after `grace` at the latest.
pub async fn run(app: &mut App, grace: Duration) -> Result<(), InquireError> {
    loop {
        app.drain();
        println!("{}", view::page(&app.title(), app.status()));

        let options = choices(app.status());
        let page_size = options.len().min(15);
        let choice = task::block_in_place(|| {
            Select::new("What would you like to do?", options)
                .with_page_size(page_size)
                .prompt()
        });
        let choice = match choice {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
                info!("Menu closed, exiting");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        debug!("Selected: {choice}");

        match choice {
            Choice::Predict { index, .. } => {
                app.trigger(index);
            }
            Choice::PredictAll => {
                app.trigger_all();
            }
            Choice::Batch => {
                app.trigger_batch();
            }
            Choice::Refresh => {}
            Choice::Reload => app.load().await,
            Choice::Quit => return Ok(()),
        }

        if !app.settle_for(grace).await {
            info!("{} predictions still pending", app.in_flight());
        }
    }
}
