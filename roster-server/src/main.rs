use clap::Parser;
use roster_server::{logging, RosterServer, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::parse();
    logging::init(&config.log)?;

    let server = RosterServer::from_config(&config)?;
    server.run(&config.bind_addr()).await
}
