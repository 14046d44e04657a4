//! Popularity ranking driver.

mod cli;
mod config;
mod feed;
mod logging;

use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use popularity_content::{ContentRegistry, ContentSnapshot};
use popularity_ranking::PopularityRanking;
use tokio::io::BufReader;
use tracing::info;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.logs)?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(top) = cli.top {
        config.ranking.top_n = top;
    }

    let registry = Arc::new(ContentRegistry::new());
    let seeded = config.seed(&registry)?;
    let ranking = PopularityRanking::with_config(Arc::clone(&registry), config.ranking);
    info!(seeded, top_n = ranking.config().top_n, "reading actions from stdin");

    let summary = ranking
        .consume(feed::actions(BufReader::new(tokio::io::stdin())))
        .await;
    info!(
        applied = summary.applied,
        skipped = summary.skipped,
        ranked = ranking.len(),
        "input exhausted"
    );

    let leaderboard = ranking.leaderboard();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&leaderboard)?);
    } else {
        print!("{}", render_table(&leaderboard));
    }

    Ok(())
}

fn render_table(rows: &[ContentSnapshot]) -> String {
    let mut out = format!(
        "{:>4}  {:>12}  {:>12}  {:>15}\n",
        "rank", "content", "popularity", "last_updated"
    );
    for (rank, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:>12}  {:>12}  {:>15}\n",
            rank + 1,
            row.id.get(),
            row.popularity,
            row.last_updated
        ));
    }
    out
}
