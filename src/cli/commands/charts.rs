use serde_json::json;

use crate::app::App;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::navigation::Route;
use crate::views::{ChartBar, ChartSummary};

const BAR_WIDTH: usize = 40;

pub async fn handle(app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    require_route(app, Route::Charts)?;

    let records = app.personas.list().await?;
    let summary = ChartSummary::from_records(&records);

    match output_format {
        OutputFormat::Json => output_json(&json!({ "charts": summary })),
        OutputFormat::Text => {
            println!("Total personas: {}", summary.total);
            if summary.is_empty() {
                println!("No data to chart yet");
                return Ok(());
            }
            print_chart("By gender", &summary.gender);
            print_chart("By age", &summary.age);
            print_chart("By gender and age", &summary.combined);
            Ok(())
        }
    }
}

fn print_chart(title: &str, bars: &[ChartBar]) {
    println!();
    println!("{}", title);
    for bar in bars {
        println!(
            "  {:<14} {} {:>3} ({:.1}%)",
            bar.label,
            render_bar(bar.percentage, BAR_WIDTH),
            bar.value,
            bar.percentage
        );
    }
}
