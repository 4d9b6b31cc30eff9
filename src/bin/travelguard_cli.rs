use chrono::Utc;
use std::path::PathBuf;
use structopt::clap::AppSettings;
use structopt::StructOpt;

use travelguard::config::Config;
use travelguard::detection::{great_circle_distance, TravelValidator};
use travelguard::input::{assemble_login_events, load_device_history, RequestHeaders};
use travelguard::models::{Coordinates, LoginEvent, TravelReport};
use travelguard::output::{OutputFormat, OutputHandler};

/// Exit status when impossible travel is detected
const EXIT_DENIED: i32 = 2;

/// Impossible travel detection for login histories
#[derive(StructOpt, Debug)]
#[structopt(name = "travelguard", about = "Impossible travel detection CLI")]
pub enum Cli {
    /// Validate the stored login history of one identity
    Check {
        /// Path to the JSON device history
        #[structopt(short, long)]
        history: PathBuf,
        /// Path to configuration file
        #[structopt(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a new login, given its request headers, against the stored history
    Login {
        /// Path to the JSON device history
        #[structopt(short, long)]
        history: PathBuf,
        /// Path to configuration file
        #[structopt(short, long)]
        config: Option<PathBuf>,
        /// Request header as "Name: value" (repeatable)
        #[structopt(short = "H", long = "header")]
        headers: Vec<String>,
        /// Deny the login when its location headers are missing or malformed
        #[structopt(long)]
        deny_on_missing_location: bool,
    },
    /// Print the great-circle distance between two points in km
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Distance {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "travelguard.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let allowed = match Cli::from_args() {
        Cli::Check { history, config } => check(history, load_config(config)?)?,
        Cli::Login {
            history,
            config,
            headers,
            deny_on_missing_location,
        } => login(history, load_config(config)?, &headers, deny_on_missing_location)?,
        Cli::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let distance = great_circle_distance(
                Coordinates::new(lon1, lat1).into(),
                Coordinates::new(lon2, lat2).into(),
            );
            println!("{:.3} km", distance);
            true
        }
        Cli::Config { output } => {
            Config::default().to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
            true
        }
    };

    if !allowed {
        std::process::exit(EXIT_DENIED);
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = Config::from_file(&path)?;
            log::debug!("Configuration loaded from {:?}", path);
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn check(history: PathBuf, config: Config) -> Result<bool, Box<dyn std::error::Error>> {
    let history = load_device_history(&history)?;
    let events = assemble_login_events(&history.devices);

    let validator = TravelValidator::new(config.validator_config());
    let report = TravelReport::new(
        &history.identity,
        validator.events_compared(&events),
        validator.find_violation(&events),
    );

    emit(&config, &report)?;
    Ok(report.valid)
}

fn login(
    history: PathBuf,
    config: Config,
    headers: &[String],
    deny_on_missing_location: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let headers = RequestHeaders::from_lines(headers.iter().map(String::as_str))?;

    if headers.bearer_token(&config.headers.authorization_header).is_some() {
        log::info!("Bearer credential present");
    } else {
        log::info!("No bearer credential, treating request as unauthenticated");
    }

    let history = load_device_history(&history)?;

    let report = match config.geo_header_extractor().coordinates(&headers) {
        Ok(coordinates) => {
            let mut events = assemble_login_events(&history.devices);
            events.push(LoginEvent::at(coordinates, Utc::now()));

            let validator = TravelValidator::new(config.validator_config());
            TravelReport::new(
                &history.identity,
                validator.events_compared(&events),
                validator.find_violation(&events),
            )
        }
        Err(e) => {
            log::warn!("Cannot locate login for '{}': {}", history.identity, e);
            TravelReport::unlocated(&history.identity, !deny_on_missing_location, &e.to_string())
        }
    };

    emit(&config, &report)?;
    Ok(report.valid)
}

fn emit(config: &Config, report: &TravelReport) -> Result<(), Box<dyn std::error::Error>> {
    if !report.valid {
        log::warn!("LOGIN DENIED: {}", report.description);
    }

    let mut output = OutputHandler::new(
        OutputFormat::from_name(&config.output.format),
        config.output.file_path.clone(),
    )?;
    output.write_report(report)?;
    Ok(())
}
