use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::models::{Gender, PersonForm, PersonRecord};
use crate::navigation::Route;
use crate::views::PersonList;

#[derive(Subcommand)]
pub enum PersonaCommands {
    #[command(about = "List personas, one page at a time")]
    List {
        #[arg(long, default_value_t = 1, help = "Page to show")]
        page: usize,
    },

    #[command(about = "Show a single persona")]
    Get {
        #[arg(help = "Persona ID")]
        id: i64,
    },

    #[command(about = "Create a persona")]
    Create {
        #[arg(long, help = "Name")]
        name: Option<String>,
        #[arg(long, help = "Age")]
        age: Option<u32>,
        #[arg(long, help = "Gender (male/female)")]
        gender: Option<Gender>,
    },

    #[command(about = "Update a persona; only the given fields are sent")]
    Update {
        #[arg(help = "Persona ID")]
        id: i64,
        #[arg(long, help = "Name")]
        name: Option<String>,
        #[arg(long, help = "Age")]
        age: Option<u32>,
        #[arg(long, help = "Gender (male/female)")]
        gender: Option<Gender>,
    },

    #[command(about = "Delete a persona")]
    Delete {
        #[arg(help = "Persona ID")]
        id: i64,
    },
}

pub async fn handle(cmd: PersonaCommands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(app, Route::Dashboard)?;

    match cmd {
        PersonaCommands::List { page } => show_page(app, &output_format, page).await,
        PersonaCommands::Get { id } => {
            let record = app.personas.get(id).await?;
            match output_format {
                OutputFormat::Json => output_json(&json!({ "persona": record })),
                OutputFormat::Text => {
                    print_table(std::slice::from_ref(&record));
                    Ok(())
                }
            }
        }
        PersonaCommands::Create { name, age, gender } => {
            let form = PersonForm { name, age, gender };
            let record = app.personas.create(&form.to_create()).await?;
            output_success(
                &output_format,
                &format!("Persona '{}' created with id {}", record.name, record.id),
                Some(json!({ "persona": record })),
            )?;
            reload(app, &output_format).await
        }
        PersonaCommands::Update { id, name, age, gender } => {
            let request = PersonForm { name, age, gender }.to_update();
            if request.is_empty() {
                return Err(anyhow::anyhow!(
                    "Nothing to update. Pass at least one of --name, --age, --gender"
                ));
            }
            let record = app.personas.update(id, &request).await?;
            output_success(
                &output_format,
                &format!("Persona {} updated", record.id),
                Some(json!({ "persona": record })),
            )?;
            reload(app, &output_format).await
        }
        PersonaCommands::Delete { id } => {
            let message = app.personas.delete(id).await?;
            let message = if message.is_empty() {
                format!("Persona {} deleted", id)
            } else {
                message
            };
            output_success(&output_format, &message, Some(json!({ "id": id })))?;
            reload(app, &output_format).await
        }
    }
}

/// Mutations are followed by a full reload rather than patching locally.
async fn reload(app: &App, output_format: &OutputFormat) -> anyhow::Result<()> {
    if matches!(output_format, OutputFormat::Text) {
        println!();
        show_page(app, output_format, 1).await?;
    }
    Ok(())
}

async fn show_page(app: &App, output_format: &OutputFormat, page: usize) -> anyhow::Result<()> {
    let mut list = PersonList::new(config().display.persona_page_size);
    list.set_records(app.personas.list().await?);

    if list.total_items() == 0 {
        return output_empty_collection(output_format, "personas", "No personas registered");
    }
    if !list.go_to_page(page) {
        return Err(anyhow::anyhow!(
            "Page {} does not exist ({} pages)",
            page,
            list.total_pages()
        ));
    }

    match output_format {
        OutputFormat::Json => output_json(&json!({
            "personas": list.page_items(),
            "page": list.current_page(),
            "pages": list.total_pages(),
            "total": list.total_items(),
        })),
        OutputFormat::Text => {
            print_table(list.page_items());
            println!(
                "Page {} of {} ({} personas)",
                list.current_page(),
                list.total_pages(),
                list.total_items()
            );
            Ok(())
        }
    }
}

fn print_table(records: &[PersonRecord]) {
    println!("{:<6} {:<30} {:<5} {:<8} {}", "ID", "NAME", "AGE", "GENDER", "CREATED");
    println!("{}", "-".repeat(70));
    for record in records {
        println!(
            "{:<6} {:<30} {:<5} {:<8} {}",
            record.id,
            truncate(&record.name, 30),
            record.age,
            record.gender.to_string(),
            crate::views::format_timestamp(&record.created_at)
        );
    }
}
