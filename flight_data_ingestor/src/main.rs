use chrono::Local;
use clap::Parser;

use flight_data_ingestor::cli::{Cli, Commands};
use flight_data_ingestor::crawl;
use flight_data_ingestor::errors::Error;
use flight_data_ingestor::models::live::LiveBoard;
use flight_data_ingestor::models::schedule::AirportSchedule;
use flight_data_ingestor::navigator::{CrawlOptions, ScheduleQuery};
use flight_data_ingestor::session::{ChromeLauncher, PageSession, SessionFactory, SessionOptions};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let launcher = ChromeLauncher::new(SessionOptions {
        headless: !cli.headed,
        ..SessionOptions::default()
    });
    let session = launcher.open().await?;
    let opts = CrawlOptions::default();

    let result = run(session.as_ref(), &opts, &cli.command).await;
    // Always release the browser, even when the fetch failed.
    session.close().await?;

    println!("{}", result?);
    Ok(())
}

async fn run(
    session: &dyn PageSession,
    opts: &CrawlOptions,
    command: &Commands,
) -> Result<String, Error> {
    match command {
        Commands::Schedule {
            airport,
            direction,
            counterpart,
        } => {
            let query = ScheduleQuery {
                airport: airport.to_uppercase(),
                direction: *direction,
                counterpart: counterpart.as_ref().map(|c| c.to_uppercase()),
            };
            let outcome = crawl::fetch_schedule(session, opts, &query).await?;
            let schedule = AirportSchedule::new(
                query.airport.clone(),
                None,
                Local::now().fixed_offset(),
                outcome.method,
                outcome.flights,
            );
            Ok(serde_json::to_string_pretty(&schedule)?)
        }
        Commands::Live { airport } => {
            let airport = airport.to_uppercase();
            let snapshot = crawl::fetch_live_board(session, opts, &airport).await?;
            let board = LiveBoard::new(airport, Local::now().fixed_offset(), snapshot);
            Ok(serde_json::to_string_pretty(&board)?)
        }
    }
}
