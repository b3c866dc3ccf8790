use clap::Parser;

/// Command line and environment configuration of the API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "roster-server", version, about = "GraphQL API over an in-memory user store")]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "ROSTER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "ROSTER_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Start with an empty store instead of the demo users
    #[arg(long)]
    pub no_seed: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log: String
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_listen_on_port_4000() {
        let config = ServerConfig::try_parse_from(["roster-server"]).expect("parses");
        assert_eq!(config.port, 4000);
        assert!(!config.no_seed);
        assert_eq!(config.log, "info");
    }

    #[rstest]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "roster-server",
            "--host",
            "127.0.0.1",
            "--port",
            "5050",
            "--no-seed"
        ])
        .expect("parses");
        assert_eq!(config.bind_addr(), "127.0.0.1:5050");
        assert!(config.no_seed);
    }

    #[rstest]
    fn rejects_invalid_ports() {
        assert!(ServerConfig::try_parse_from(["roster-server", "--port", "http"]).is_err());
    }
}
