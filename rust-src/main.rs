//! Sales dashboard CLI.
//!
//! Filtering, aggregation and charting of spreadsheet sales data.

mod aggregation;
mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;
mod models;
mod visualization;


fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
