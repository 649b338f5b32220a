use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;
use crate::AppError;

#[derive(Parser, Debug)]
#[clap(name = "hero-cards")]
#[clap(version, about = "Resolve handles to Union hero cards", long_about = None)]
pub struct Cli {
    #[clap(
        long,
        global = true,
        value_parser,
        help = "Path to the configuration file"
    )]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<(), AppError> {
        self.command.run(self.config.as_deref()).await
    }
}
