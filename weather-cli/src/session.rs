//! Interactive session: a menu loop over one `WeatherApp`.

use anyhow::Context;
use inquire::{InquireError, Select, Text};
use weather_now_core::{AppResult, WeatherApp};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    CurrentLocation,
    SearchAgain,
    TryAgain,
    Quit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Search => "Search for a city",
            Action::CurrentLocation => "Use current location",
            Action::SearchAgain => "Search again",
            Action::TryAgain => "Try again",
            Action::Quit => "Quit",
        })
    }
}

/// Actions offered for a given state.
fn actions_for(state: &AppResult) -> Vec<Action> {
    match state {
        AppResult::Idle | AppResult::Loading => {
            vec![Action::Search, Action::CurrentLocation, Action::Quit]
        }
        AppResult::Success { .. } => vec![Action::SearchAgain, Action::Quit],
        AppResult::Error { .. } => vec![Action::TryAgain, Action::Quit],
    }
}

pub async fn run(app: &WeatherApp, json: bool) -> anyhow::Result<()> {
    let mut rx = app.subscribe();
    let progress = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().is_loading() {
                eprintln!("{}", render::text(&AppResult::Loading));
            }
        }
    });

    let outcome = menu_loop(app, json).await;
    progress.abort();
    outcome
}

async fn menu_loop(app: &WeatherApp, json: bool) -> anyhow::Result<()> {
    loop {
        let options = actions_for(&app.state());
        let Some(action) = ask(move || Select::new("What next?", options).prompt()).await? else {
            return Ok(());
        };

        match action {
            Action::Search => {
                let Some(city) = ask(|| Text::new("City:").prompt()).await? else {
                    continue;
                };
                app.search(&city).await;
            }
            Action::CurrentLocation => {
                app.current_location().await;
            }
            Action::SearchAgain | Action::TryAgain => {
                app.reset();
                continue;
            }
            Action::Quit => return Ok(()),
        }

        let state = app.state();
        if matches!(state, AppResult::Idle) {
            continue;
        }
        if json {
            println!("{}", render::json(&state)?);
        } else {
            println!("{}\n", render::text(&state));
        }
    }
}

/// Run a blocking prompt off the runtime. Escape or Ctrl-C yields `None`.
async fn ask<T, F>(prompt: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(prompt).await.context("Prompt task failed")?;
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}
