use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::navigation::Route;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register a new user")]
    Register {
        #[arg(help = "Full name")]
        full_name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from the server")]
    Logout,

    #[command(about = "Show local authentication status")]
    Status,

    #[command(about = "Show current user information from the server")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            require_route(app, Route::Login)?;
            let password = resolve_password(password)?;

            let session = app.auth.login(&email, &password).await?;
            app.enter(Route::Dashboard);

            let name = session
                .user
                .as_ref()
                .map(|user| user.full_name.clone())
                .unwrap_or_else(|| email.clone());
            output_success(
                &output_format,
                &format!("Logged in as {}", name),
                Some(json!({ "user": session.user })),
            )
        }
        AuthCommands::Register { full_name, email, password } => {
            require_route(app, Route::Register)?;
            let password = resolve_password(password)?;

            let response = app.auth.register(&full_name, &email, &password).await?;
            let message = if response.message.is_empty() {
                format!("User {} registered. You can now log in", email)
            } else {
                response.message.clone()
            };
            output_success(&output_format, &message, Some(json!({ "user": response.data })))
        }
        AuthCommands::Logout => {
            app.auth.logout().await?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = app.store.get();
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "authenticated": session.is_authenticated(),
                    "user": session.user,
                })),
                OutputFormat::Text => {
                    match (&session.token, &session.user) {
                        (Some(_), Some(user)) => {
                            println!("Logged in as {} <{}>", user.full_name, user.email)
                        }
                        (Some(_), None) => println!("Token present, no cached profile"),
                        (None, _) => println!("Not logged in"),
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Whoami => {
            require_route(app, Route::Dashboard)?;
            let profile = app.auth.me().await?;
            match output_format {
                OutputFormat::Json => output_json(&json!({ "user": profile })),
                OutputFormat::Text => {
                    println!("ID:    {}", profile.id);
                    println!("Name:  {}", profile.full_name);
                    println!("Email: {}", profile.email);
                    Ok(())
                }
            }
        }
    }
}
