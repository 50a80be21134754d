//! Fabula CLI binary.
//!
//! This binary provides command-line access to Fabula's functionality:
//! - Generate a story and render its storyboard
//! - Extract structured data from a saved model reply

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, extract_file, run_storyboard};

    // Credentials may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    fabula::telemetry::init_console_telemetry(cli.verbose)?;

    match cli.command {
        Commands::Run {
            output_dir,
            config,
            no_consolidation,
        } => {
            run_storyboard(output_dir, config, no_consolidation).await?;
        }

        Commands::Extract { file } => {
            let json = extract_file(file.as_deref()).await?;
            println!("{}", json);
        }
    }

    Ok(())
}
