//! Command-line interface

pub mod context;
pub mod land;
pub mod style;

use anstream::println;
use async_trait::async_trait;
use indicatif::ProgressBar;
use prland::land::LandStage;
use prland::progress::ProgressCallback;
use std::sync::Mutex;
use std::time::Duration;
use style::{Stylize, check, spinner_style};

/// Progress reporter for terminal output
///
/// Prints one line per completed stage and spins while a status check is
/// being waited on.
#[derive(Default)]
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a reporter
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Clear any running spinner before final output
    pub fn finish(&self) {
        self.stop_spinner();
    }

    fn stop_spinner(&self) {
        let spinner = self
            .spinner
            .lock()
            .map(|mut guard| guard.take())
            .unwrap_or_default();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_stage(&self, stage: &LandStage) {
        self.stop_spinner();
        println!("{} {}", check(), stage);
    }

    async fn on_waiting(&self, sha: &str, context: &str) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!(
            "Waiting for {} on {}",
            context.emphasis(),
            sha.accent()
        ));
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(spinner);
        }
    }

    async fn on_message(&self, message: &str) {
        let spinner = self.spinner.lock().ok().and_then(|guard| guard.clone());
        match spinner {
            Some(spinner) => spinner.println(message.muted()),
            None => println!("{}", message.muted()),
        }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
