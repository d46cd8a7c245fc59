use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::models::{AuditAction, AuditEntry, AuditFilters};
use crate::navigation::Route;
use crate::services::audit_service::DEFAULT_MY_AUDITS_LIMIT;
use crate::views::{format_timestamp, AuditView};

#[derive(Subcommand)]
pub enum AuditCommands {
    #[command(about = "List audit entries")]
    List {
        #[arg(long, default_value_t = 1, help = "Page to show")]
        page: u32,
        #[arg(long, help = "Entries per page")]
        limit: Option<u32>,
        #[arg(long, help = "Only entries by this user id")]
        user_id: Option<i64>,
        #[arg(long, help = "Entity type, e.g. PERSONA")]
        entity_type: Option<String>,
        #[arg(long, help = "Entity id")]
        entity_id: Option<i64>,
        #[arg(long, help = "CREATE, UPDATE or DELETE")]
        action: Option<String>,
        #[arg(long, help = "Start date (ISO 8601)")]
        start_date: Option<String>,
        #[arg(long, help = "End date (ISO 8601)")]
        end_date: Option<String>,
    },

    #[command(about = "Show audit statistics")]
    Stats,

    #[command(about = "List entries created by the current user")]
    Mine {
        #[arg(long, default_value_t = 1, help = "Page to show")]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_MY_AUDITS_LIMIT, help = "Entries per page")]
        limit: u32,
    },
}

pub async fn handle(cmd: AuditCommands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(app, Route::Audit)?;

    match cmd {
        AuditCommands::List {
            page,
            limit,
            user_id,
            entity_type,
            entity_id,
            action,
            start_date,
            end_date,
        } => {
            let limit = limit.unwrap_or(config().display.audit_page_size);
            let mut view = AuditView::new(limit);
            let filters = AuditFilters {
                user_id,
                entity_type,
                entity_id,
                action,
                start_date,
                end_date,
                ..AuditFilters::page(page, limit)
            };

            let response = app.audits.list(&filters).await?;
            view.apply(response);
            view.go_to_page(page);
            show_entries(&view, &output_format)
        }
        AuditCommands::Stats => {
            let stats = app.audits.stats().await?;
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "stats": stats,
                    "total": stats.total_actions(),
                })),
                OutputFormat::Text => {
                    println!("Total actions: {}", stats.total_actions());
                    for action in [AuditAction::Create, AuditAction::Update, AuditAction::Delete] {
                        println!(
                            "  {} {:<7} {}",
                            action.icon(),
                            action.as_str(),
                            stats.count_for(action)
                        );
                    }
                    if !stats.top_users.is_empty() {
                        println!();
                        println!("Top users");
                        for bucket in &stats.top_users {
                            println!("  {:<30} {}", truncate(&bucket.key, 30), bucket.count);
                        }
                    }
                    Ok(())
                }
            }
        }
        AuditCommands::Mine { page, limit } => {
            let mut view = AuditView::new(limit);
            let response = app.audits.my_audits(page, limit).await?;
            view.apply(response);
            view.go_to_page(page);
            show_entries(&view, &output_format)
        }
    }
}

fn show_entries(view: &AuditView, output_format: &OutputFormat) -> anyhow::Result<()> {
    if view.entries().is_empty() {
        return output_empty_collection(output_format, "audits", "No audit entries found");
    }

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "audits": view.entries(),
            "page": view.current_page(),
            "pages": view.total_pages(),
            "total": view.total_items(),
        })),
        OutputFormat::Text => {
            println!(
                "{:<3} {:<7} {:<16} {:<28} {}",
                "", "ACTION", "ENTITY", "USER", "WHEN"
            );
            println!("{}", "-".repeat(80));
            for entry in view.entries() {
                print_entry(entry);
            }

            let window = view
                .page_window()
                .into_iter()
                .map(|p| {
                    if p == view.current_page() {
                        format!("[{}]", p)
                    } else {
                        p.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "Page {} of {} ({} entries)  {}",
                view.current_page(),
                view.total_pages(),
                view.total_items(),
                window
            );
            Ok(())
        }
    }
}

fn print_entry(entry: &AuditEntry) {
    let actor = if entry.actor_email.is_empty() {
        entry.actor_name.clone()
    } else {
        format!("{} <{}>", entry.actor_name, entry.actor_email)
    };
    println!(
        "{:<3} {:<7} {:<16} {:<28} {}",
        entry.action.icon(),
        entry.action.as_str(),
        format!("{} #{}", entry.entity_type, entry.entity_id),
        truncate(&actor, 28),
        format_timestamp(&entry.timestamp)
    );
}
