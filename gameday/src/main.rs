use clap::{Parser, Subcommand};
use gameday_common::{
    config::{Config, PredictionMode},
    predict::PredictionSource,
    roster::{LoadStatus, RosterSource},
};
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::{
    error::Error,
    path::{Path, PathBuf},
    time::Duration,
};

mod app;
mod interactive;

use app::{App, view};

const APP_NAME: &str = "gameday";

/// How long the menu waits for predictions before redrawing anyway
const MENU_GRACE: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Config file to use instead of the platform default
    config: Option<PathBuf>,

    #[clap(long)]
    /// Schedule file or http(s) URL, overrides the config file
    roster: Option<String>,

    #[clap(long)]
    /// Base URL of the prediction service, overrides the config file
    service_url: Option<String>,

    #[clap(long, conflicts_with = "service_url")]
    /// Predict with local random draws instead of the service
    mock: bool,

    #[clap(long)]
    /// Seed for the local random draws
    seed: Option<u64>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the schedule and exit
    Show,
    /// Predict games, wait for the results, then print the schedule
    Predict {
        #[clap(long, short)]
        /// Number of the game to predict, as shown by `show`
        card: Option<usize>,

        #[clap(long, conflicts_with = "card")]
        /// Predict every game (the default when no game is given)
        all: bool,

        #[clap(long, conflicts_with_all = ["card", "all"])]
        /// Predict every game with a single request to the service
        batch: bool,
    },
    /// Pick games to predict from a menu (the default)
    Interactive,
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("gameday-logs");
            path
        }
    };
    let log_path = log_base_path.join(format!("{APP_NAME}-log.txt"));
    let archived_log_path = log_base_path.join(format!("{APP_NAME}-log-{{}}.txt.gz"));

    // Only log to the console in debug mode
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("The log location is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Everything else only logs errors
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));
    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level))
        .logger(Logger::builder().build("gameday_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => confy::get_configuration_file_path(APP_NAME, None)?,
    };
    info!("Reading config file from {path:?}");

    match confy::load_path(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store_path(&path, &config)?;
            Ok(config)
        }
    }
}

/// Command line flags win over the config file
fn apply_overrides(config: &mut Config, args: &Cli) {
    if let Some(roster) = &args.roster {
        config.roster.location = roster.clone();
    }
    if let Some(url) = &args.service_url {
        config.prediction.url = url.clone();
        config.prediction.mode = PredictionMode::Service;
    }
    if args.mock {
        config.prediction.mode = PredictionMode::Mock;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_logging(&args)?;

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let Ok(roster_source) = config.roster.location.parse::<RosterSource>();
    let source = PredictionSource::from_config(&config.prediction, args.seed)?;
    match source.mode() {
        PredictionMode::Service => info!("Predicting with the service at {}", config.prediction.url),
        PredictionMode::Mock => info!("Predicting with local random draws"),
    }

    let mut app = App::new(&config, roster_source, source)?;
    app.load().await;

    match args.command.unwrap_or(Command::Interactive) {
        Command::Show => print!("{}", view::page(&app.title(), app.status())),
        Command::Predict { card, batch, .. } => {
            if matches!(app.status(), LoadStatus::Loaded(_)) {
                match card {
                    Some(number) => {
                        if number == 0 || !app.trigger(number - 1) {
                            error!("There is no game number {number}");
                            eprintln!("There is no game number {number}");
                            std::process::exit(2);
                        }
                    }
                    None if batch => {
                        app.trigger_batch();
                    }
                    None => {
                        app.trigger_all();
                    }
                }
                app.settle_all().await;
            }
            print!("{}", view::page(&app.title(), app.status()));
        }
        Command::Interactive => interactive::run(&mut app, MENU_GRACE).await?,
    }

    if let LoadStatus::Failed(_) = app.status() {
        std::process::exit(1);
    }
    Ok(())
}
