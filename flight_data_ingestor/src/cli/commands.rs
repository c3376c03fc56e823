use clap::{Parser, Subcommand};

use crate::models::direction::Direction;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the flight schedule for one airport and print it as JSON
    Schedule {
        /// 3-letter airport code (e.g. "PUS")
        #[arg(long)]
        airport: String,

        /// Which side of the board to query
        #[arg(long, value_enum, default_value_t = Direction::Departure)]
        direction: Direction,

        /// Optional counterpart airport to narrow the route (e.g. "NRT")
        #[arg(long)]
        counterpart: Option<String>,
    },

    /// Fetch the live departure/arrival boards for one airport
    Live {
        /// 3-letter airport code (e.g. "GMP")
        #[arg(long)]
        airport: String,
    },
}
