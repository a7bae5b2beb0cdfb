//! statusboard エントリーポイント

use clap::Parser;
use statusboard::cli::{check, serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    statusboard::logging::init()?;

    match cli.command {
        Some(Commands::Serve(args)) => serve::execute(&args).await,
        None => serve::execute(&serve::ServeArgs::default()).await,
        Some(Commands::Check(args)) => {
            if !check::execute(&args).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
