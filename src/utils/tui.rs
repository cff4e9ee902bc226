use std::future::Future;

use chaincal_core::loading::LoadingFlag;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Drive `work` to completion, showing a spinner whenever `loading` is set.
pub async fn while_loading<F: Future>(loading: &LoadingFlag, message: &str, work: F) -> F::Output {
    let mut rx = loading.subscribe();
    let mut spinner: Option<ProgressBar> = None;
    let mut watching = true;
    tokio::pin!(work);

    let output = loop {
        if rx.is_loading() {
            if spinner.is_none() {
                spinner = Some(create_spinner(message.to_string()));
            }
        } else if let Some(s) = spinner.take() {
            s.finish_and_clear();
        }

        tokio::select! {
            output = &mut work => break output,
            alive = rx.changed(), if watching => watching = alive,
        }
    };

    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    output
}
