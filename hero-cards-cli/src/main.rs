use clap::Parser;

mod cli;
mod commands;
mod error;

use cli::Cli;
pub use error::AppError;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Cli::parse();
    if let Err(e) = args.run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
