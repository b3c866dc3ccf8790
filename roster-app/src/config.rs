use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "roster-app", version, about = "Create and list users through the roster API")]
pub struct AppConfig {
    /// GraphQL endpoint of the roster API
    #[arg(long, env = "ROSTER_API_URL", default_value = "http://localhost:4000")]
    pub api_url: String
}
