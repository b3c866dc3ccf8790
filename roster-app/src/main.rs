use clap::Parser;
use roster_app::{init_logging, tui, AppConfig, AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::parse();
    init_logging()?;
    tui::run(&config).await
}
