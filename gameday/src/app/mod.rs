use gameday_common::{
    board::Board,
    config::{Config, Team},
    predict::{PredictionSource, Started},
    roster::{LoadStatus, RosterError, RosterLoader, RosterSource, RosterStatus},
};
use log::*;
use std::time::Duration;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task, time,
};

mod message;
pub mod view;

pub use message::Message;

pub struct App {
    team: Team,
    pinned: usize,
    roster_source: RosterSource,
    loader: RosterLoader,
    source: PredictionSource,
    status: LoadStatus<Board>,
    epoch: u64,
    msg_tx: UnboundedSender<Message>,
    msg_rx: UnboundedReceiver<Message>,
}

impl App {
    pub fn new(
        config: &Config,
        roster_source: RosterSource,
        source: PredictionSource,
    ) -> Result<Self, RosterError> {
        let (msg_tx, msg_rx) = unbounded_channel();
        Ok(Self {
            team: config.team.clone(),
            pinned: config.roster.pinned_count,
            roster_source,
            loader: RosterLoader::new(config.roster.timeout())?,
            source,
            status: LoadStatus::Loading,
            epoch: 0,
            msg_tx,
            msg_rx,
        })
    }

    pub fn title(&self) -> String {
        format!("{} {} Calendar", self.team.name, self.team.season)
    }

    pub fn status(&self) -> &LoadStatus<Board> {
        &self.status
    }

    pub fn source(&self) -> &PredictionSource {
        &self.source
    }

    /// Loads the schedule again, replacing every card. Predictions still in
    /// flight for the previous board are dropped when they arrive.
    pub async fn load(&mut self) {
        self.epoch += 1;
        self.status = LoadStatus::Loading;

        let status: RosterStatus = self.loader.load(&self.roster_source).await.into();
        match &status {
            LoadStatus::Loaded(roster) => info!("Schedule has {} games", roster.len()),
            LoadStatus::Failed(reason) => error!("Could not load the schedule: {reason}"),
            LoadStatus::Loading => {}
        }

        let team = self.team.name.clone();
        let pinned = self.pinned;
        self.status = status.map(|roster| Board::new(&team, roster, pinned));
    }

    pub fn in_flight(&self) -> usize {
        self.status.loaded().map_or(0, Board::in_flight)
    }

    /// Starts a prediction for one card. Returns `false` if there is no such
    /// card to predict.
    pub fn trigger(&mut self, index: usize) -> bool {
        let Some(board) = self.status.loaded_mut() else {
            warn!("No schedule loaded, can't predict card {index}");
            return false;
        };
        let Some(ticket) = board.request(index) else {
            warn!("There is no card {index}");
            return false;
        };
        let Some(card) = board.card(index) else {
            return false;
        };

        match self.source.start(card.game()) {
            Started::Settled(result) => {
                board.settle(ticket, result);
            }
            Started::InFlight(prediction) => {
                let tx = self.msg_tx.clone();
                let epoch = self.epoch;
                task::spawn(async move {
                    let result = prediction.await;
                    if tx
                        .send(Message::PredictionSettled {
                            epoch,
                            ticket,
                            result,
                        })
                        .is_err()
                    {
                        debug!("App closed before the prediction settled");
                    }
                });
            }
        }
        true
    }

    /// Starts a prediction for every card at once. Returns how many started.
    pub fn trigger_all(&mut self) -> usize {
        let count = self.status.loaded().map_or(0, Board::len);
        (0..count).filter(|&index| self.trigger(index)).count()
    }

    /// Asks the service for the whole schedule in one request. The mock has
    /// no such request, so every card is predicted on its own instead.
    pub fn trigger_batch(&mut self) -> usize {
        let PredictionSource::Service(client) = &self.source else {
            info!("Batch prediction needs the service, predicting each game instead");
            return self.trigger_all();
        };
        let Some(board) = self.status.loaded_mut() else {
            warn!("No schedule loaded, can't request a batch prediction");
            return 0;
        };

        let tickets = board.request_all();
        let count = tickets.len();
        let request = client.predict_all();
        let tx = self.msg_tx.clone();
        let epoch = self.epoch;
        task::spawn(async move {
            let result = request.await;
            if tx
                .send(Message::BatchSettled {
                    epoch,
                    tickets,
                    result,
                })
                .is_err()
            {
                debug!("App closed before the batch prediction settled");
            }
        });
        count
    }

    /// Applies one settled result. Returns `false` if it was discarded.
    pub fn handle(&mut self, message: Message) -> bool {
        if message.epoch() != self.epoch {
            debug!(
                "Dropping a result for schedule load {}, current is {}",
                message.epoch(),
                self.epoch
            );
            return false;
        }
        let Some(board) = self.status.loaded_mut() else {
            return false;
        };

        match message {
            Message::PredictionSettled { ticket, result, .. } => board.settle(ticket, result),
            Message::BatchSettled {
                tickets, result, ..
            } => board.settle_batch(&tickets, result) > 0,
        }
    }

    /// Applies every result that has already arrived, without waiting
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.msg_rx.try_recv() {
            if self.handle(message) {
                handled += 1;
            }
        }
        handled
    }

    /// Waits until no card of the current board is awaiting a prediction
    pub async fn settle_all(&mut self) {
        while self.in_flight() > 0 {
            match self.msg_rx.recv().await {
                Some(message) => {
                    self.handle(message);
                }
                None => break,
            }
        }
    }

    /// Like `settle_all`, but gives up after `grace`. Returns `true` if
    /// everything settled.
    pub async fn settle_for(&mut self, grace: Duration) -> bool {
        time::timeout(grace, self.settle_all()).await.is_ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gameday_common::{
        card::CardState,
        config::{Prediction, PredictionMode},
        predict::UNAVAILABLE_MESSAGE,
    };
    use mockito::{Server, ServerGuard};
    use std::{io::Write, net::TcpListener};
    use tempfile::NamedTempFile;

    const SCHEDULE: &str = r#"[
        {"date":"2025-09-07","opponent":"Raiders","home":true,"time":"13:00"},
        {"date":"2025-09-14","opponent":"Dolphins","home":false,"time":"16:25"},
        {"date":"2025-12-28","opponent":"Jets","home":false},
        {"date":"2026-01-04","opponent":"Bills","home":true}
    ]"#;

    fn schedule_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// The schedule file is removed once the returned handle is dropped
    fn app_with(prediction: Prediction, schedule: &str) -> (App, NamedTempFile) {
        let config = Config {
            prediction,
            ..Default::default()
        };
        let file = schedule_file(schedule);
        let source = PredictionSource::from_config(&config.prediction, Some(5)).unwrap();
        let roster = RosterSource::File(file.path().to_path_buf());
        (App::new(&config, roster, source).unwrap(), file)
    }

    fn mock_app() -> (App, NamedTempFile) {
        let prediction = Prediction {
            mode: PredictionMode::Mock,
            ..Default::default()
        };
        app_with(prediction, SCHEDULE)
    }

    fn service_app(url: String) -> (App, NamedTempFile) {
        let prediction = Prediction {
            url,
            timeout_secs: 5,
            ..Default::default()
        };
        app_with(prediction, SCHEDULE)
    }

    fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn service(path: &str, method: &str, body: &str) -> ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock(method, path)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        server
    }

    fn display(app: &App, index: usize) -> Option<String> {
        app.status()
            .loaded()
            .and_then(|board| board.card(index))
            .and_then(|card| card.display().map(str::to_string))
    }

    #[tokio::test]
    async fn test_load_schedule() {
        let (mut app, _schedule) = mock_app();
        assert_eq!(app.title(), "Patriots 2025 Calendar");
        assert_eq!(*app.status(), LoadStatus::Loading);

        app.load().await;
        let board = app.status().loaded().unwrap();
        assert_eq!(board.len(), 4);
        assert_eq!(board.sections().1.len(), 2);
        assert_eq!(board.card(2).unwrap().game().kickoff(), "TBD");
    }

    #[tokio::test]
    async fn test_load_failure_is_visible() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            prediction: Prediction {
                mode: PredictionMode::Mock,
                ..Default::default()
            },
            ..Default::default()
        };
        let source = PredictionSource::from_config(&config.prediction, None).unwrap();
        let roster = RosterSource::File(dir.path().join("missing-games.json"));
        let mut app = App::new(&config, roster, source).unwrap();

        app.load().await;
        match app.status() {
            LoadStatus::Failed(reason) => {
                assert!(reason.contains("missing-games.json"), "{reason}")
            }
            other => panic!("Expected a failed load, got {other:?}"),
        }
        assert!(!app.trigger(0));
        assert_eq!(app.trigger_all(), 0);
    }

    #[tokio::test]
    async fn test_malformed_schedule_fails() {
        let prediction = Prediction {
            mode: PredictionMode::Mock,
            ..Default::default()
        };
        let (mut app, _schedule) = app_with(
            prediction,
            r#"[{"date":"2025-09-07","opponent":"Jets","home":true}, {"opponent":"Bills"}]"#,
        );
        app.load().await;
        assert!(matches!(app.status(), LoadStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_mock_trigger_settles_immediately() {
        let (mut app, _schedule) = mock_app();
        app.load().await;

        assert!(app.trigger(1));
        assert_eq!(app.in_flight(), 0);
        let text = display(&app, 1).unwrap();
        assert!(text.starts_with("Patriots will likely "), "{text}");
        assert_eq!(display(&app, 0), None);

        assert!(!app.trigger(4));
    }

    #[tokio::test]
    async fn test_mock_batch_predicts_every_card() {
        let (mut app, _schedule) = mock_app();
        app.load().await;
        assert_eq!(app.trigger_batch(), 4);
        assert_eq!(app.in_flight(), 0);
        let board = app.status().loaded().unwrap();
        assert!(
            board
                .cards()
                .iter()
                .all(|card| card.state() == CardState::SettledSuccess)
        );
    }

    #[tokio::test]
    async fn test_service_prediction() {
        let server = service("/predict", "POST", r#"{"result":"WIN","confidence":0.732}"#).await;
        let (mut app, _schedule) = service_app(server.url());
        app.load().await;

        assert!(app.trigger(0));
        assert_eq!(app.in_flight(), 1);
        assert_eq!(
            app.status().loaded().unwrap().card(0).unwrap().state(),
            CardState::Awaiting
        );

        app.settle_all().await;
        assert_eq!(
            display(&app, 0).as_deref(),
            Some("Patriots will likely WIN (Confidence: 73.2%)")
        );
    }

    #[tokio::test]
    async fn test_service_unavailable() {
        let (mut app, _schedule) = service_app(refused_url());
        app.load().await;

        assert_eq!(app.trigger_all(), 4);
        assert!(app.settle_for(Duration::from_secs(10)).await);
        for index in 0..4 {
            assert_eq!(display(&app, index).as_deref(), Some(UNAVAILABLE_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_service_batch() {
        let server = service(
            "/predict_all",
            "GET",
            r#"[
                {"date":"2025-09-07","opponent":"LV","prediction":"win","confidence":0.64},
                {"date":"2025-09-14","opponent":"Dolphins","prediction":"lose","confidence":0.41}
            ]"#,
        )
        .await;
        let (mut app, _schedule) = service_app(server.url());
        app.load().await;

        assert_eq!(app.trigger_batch(), 4);
        app.settle_all().await;
        assert_eq!(
            display(&app, 0).as_deref(),
            Some("Patriots will likely win (Confidence: 64.0%)")
        );
        assert_eq!(
            display(&app, 1).as_deref(),
            Some("Patriots will likely lose (Confidence: 41.0%)")
        );
        assert_eq!(display(&app, 3).as_deref(), Some(UNAVAILABLE_MESSAGE));
    }

    #[tokio::test]
    async fn test_results_for_previous_load_are_dropped() {
        let (mut app, _schedule) = service_app(refused_url());
        app.load().await;
        assert!(app.trigger(0));

        app.load().await;
        assert_eq!(app.in_flight(), 0);

        let message = app.msg_rx.recv().await.unwrap();
        assert!(!app.handle(message));
        let card = app.status().loaded().unwrap().card(0).unwrap();
        assert_eq!(card.state(), CardState::Idle);
        assert_eq!(card.display(), None);
    }

    #[tokio::test]
    async fn test_drain_without_results() {
        let (mut app, _schedule) = mock_app();
        app.load().await;
        assert_eq!(app.drain(), 0);
        assert!(app.settle_for(Duration::from_millis(10)).await);
    }
}
