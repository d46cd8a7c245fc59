use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::app::App;
use crate::cli::OutputFormat;
use crate::error::ApiError;
use crate::navigation::Route;
use crate::session::GuardDecision;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a failed backend call in the appropriate format
pub fn output_api_error(output_format: &OutputFormat, error: &ApiError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&error.to_json())?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", error);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Enter the route a command belongs to, turning a guard redirect into a
/// user-facing error.
pub fn require_route(app: &App, route: Route) -> anyhow::Result<()> {
    match app.enter(route) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Redirect(Route::Login) => Err(anyhow::anyhow!(
            "Not logged in. Run `personas auth login <email>` first"
        )),
        GuardDecision::Redirect(_) => {
            let who = app
                .store
                .current_user()
                .map(|user| format!(" as {}", user.email))
                .unwrap_or_default();
            Err(anyhow::anyhow!(
                "Already logged in{}. Run `personas auth logout` first",
                who
            ))
        }
    }
}

/// Use the provided password or read one line from stdin.
pub fn resolve_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow::anyhow!("Password is required"));
    }
    Ok(password)
}

/// Fixed-width text bar for chart output.
pub fn render_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
