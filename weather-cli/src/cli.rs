use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, CustomType, Select};
use weather_now_core::{
    AppResult, Config, ConfiguredGeolocator, Coordinates, LocationQuery, PermissionState,
    Providers, WeatherApp,
};

use crate::{prompt::TerminalConsent, render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-now", version, about = "Current weather for a city or for where you are")]
pub struct Cli {
    /// Print the result as JSON instead of a weather card.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Without a subcommand an interactive session starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the weather for a city.
    Search {
        /// City name; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Show the weather at the device location.
    Here {
        /// Use the approximate IP-based location without asking.
        #[arg(long, conflicts_with = "no")]
        yes: bool,

        /// Never fall back to the approximate IP-based location.
        #[arg(long)]
        no: bool,
    },

    /// Configure device location settings interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Some(Command::Configure) => configure(config),
            Some(Command::Search { city }) => {
                let app = build_app(&config, TerminalConsent::ask())?;
                let result = app.run(LocationQuery::Search(city.join(" "))).await;
                finish(&result, self.json)
            }
            Some(Command::Here { yes, no }) => {
                let consent = match (yes, no) {
                    (true, _) => TerminalConsent::preset(true),
                    (_, true) => TerminalConsent::preset(false),
                    _ => TerminalConsent::ask(),
                };
                let app = build_app(&config, consent)?;
                let result = app.run(LocationQuery::CurrentLocation).await;
                finish(&result, self.json)
            }
            None => {
                let app = build_app(&config, TerminalConsent::ask())?;
                session::run(&app, self.json).await
            }
        }
    }
}

pub fn build_app(config: &Config, consent: TerminalConsent) -> anyhow::Result<WeatherApp> {
    let providers = Providers::from_config(config)?;
    let geolocator = ConfiguredGeolocator::new(&config.geolocation);
    Ok(WeatherApp::new(providers, Box::new(geolocator), Box::new(consent)))
}

/// Print a settled result; an error state becomes a failing exit status.
fn finish(result: &AppResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render::json(result)?);
        if let Some(message) = result.error_message() {
            bail!("{message}");
        }
        return Ok(());
    }

    match result {
        AppResult::Error { message } => bail!("{message}"),
        other => {
            println!("{}", render::text(other));
            Ok(())
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    println!("Configuring device location ({})", path.display());

    let geo = &mut config.geolocation;

    geo.enabled = Confirm::new("Allow \"use my location\"?")
        .with_default(geo.enabled)
        .prompt()
        .context("Failed to read geolocation setting")?;

    if geo.enabled {
        let choice = Select::new(
            "Device position:",
            vec!["Set fixed coordinates", "None (ask for approximate IP location)"],
        )
        .prompt()
        .context("Failed to read position choice")?;

        if choice.starts_with("Set") {
            let latitude = CustomType::<f64>::new("Latitude:")
                .with_error_message("Please enter a number")
                .prompt()
                .context("Failed to read latitude")?;
            let longitude = CustomType::<f64>::new("Longitude:")
                .with_error_message("Please enter a number")
                .prompt()
                .context("Failed to read longitude")?;

            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                bail!("Coordinates out of range: ({latitude}, {longitude})");
            }
            geo.set_position(Coordinates { latitude, longitude });
        } else {
            geo.clear_position();
        }

        let blocked = Confirm::new("Treat location permission as blocked?")
            .with_default(geo.permission == Some(PermissionState::Denied))
            .prompt()
            .context("Failed to read permission setting")?;
        geo.permission = blocked.then_some(PermissionState::Denied);
    }

    config.save()?;
    println!("Saved.");
    Ok(())
}
