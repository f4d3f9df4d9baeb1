use api_alchemist::shell::ShellOutcome;
use api_alchemist::{run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(ShellOutcome::Completed(_)) => {}
        Ok(ShellOutcome::MissingArchive) | Ok(ShellOutcome::MissingCredential) => {
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("[ERROR] Transformation failed: {e}");
            std::process::exit(1);
        }
    }
}
