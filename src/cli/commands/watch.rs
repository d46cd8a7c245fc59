use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::app::App;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::navigation::Route;

/// Keep a session open and watch it until Ctrl-C or until it is invalidated
/// (token removed by another client or edited away).
pub async fn handle(app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(app, Route::Dashboard)?;

    let mut invalidations = app.monitor.invalidations();
    app.monitor.start_monitoring();

    if matches!(output_format, OutputFormat::Text) {
        let who = app
            .store
            .current_user()
            .map(|user| user.email)
            .unwrap_or_else(|| "unknown user".to_string());
        println!("Watching session for {} (Ctrl-C to stop)", who);
    }

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
        cause = invalidations.recv() => match cause {
            Ok(cause) => Some(cause.to_string()),
            Err(RecvError::Lagged(_)) => Some("session invalidated".to_string()),
            Err(RecvError::Closed) => None,
        },
    };

    app.monitor.stop_monitoring();

    match outcome {
        Some(reason) => {
            let location = app.navigator.current().unwrap_or(Route::Login);
            output_success(
                &output_format,
                &format!("Session ended: {}. Redirected to {}", reason, location),
                Some(json!({ "reason": reason, "route": location.path() })),
            )
        }
        None => output_success(&output_format, "Stopped watching", None),
    }
}
