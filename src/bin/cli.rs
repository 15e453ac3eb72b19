use anyhow::Result;
use cfb_betting_edge::config::Config;
use cfb_betting_edge::odds_api::OddsApiClient;
use cfb_betting_edge::run_weekly_predictions;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    config.validate()?;

    println!("College Football Spread Edge Finder\n");

    let run = run_weekly_predictions(&config).await?;
    let output = &run.output;

    println!(
        "Week {}: {} games, {} predicted, lines found for {}\n",
        run.week,
        run.schedule_len,
        output.predictions.len(),
        output.lines_found()
    );

    println!("RECOMMENDED BETS\n");
    let bets = output.top_bets(config.top);
    if bets.is_empty() {
        println!("No games with an edge over {:.1} points.", config.no_edge_threshold);
    } else {
        println!("Top {} bets by edge:\n", bets.len());
        for (i, bet) in bets.iter().enumerate() {
            println!("{}. {}", i + 1, bet.format());
        }
    }

    if !output.issues.is_empty() {
        println!("\nGAMES NEEDING ATTENTION\n");
        for issue in &output.issues {
            println!("- {}", issue);
        }
    }

    println!("\nSaved predictions to {}", config.output_csv.display());
    println!("Saved analysis to {}", config.analysis_csv.display());

    // Check API usage
    if let (Some(key), false) = (&config.odds_api_key, config.use_cache) {
        println!();
        OddsApiClient::new(key.clone()).check_usage().await?;
    }

    Ok(())
}
