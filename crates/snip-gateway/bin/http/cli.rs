use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use snip_core::keyspace::MIN_KEY_LENGTH;
use snip_gateway::telemetry::LogFormat;
use snip_shortener::allocator::DEFAULT_MAX_ATTEMPTS;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SNIP_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "SNIP_STORAGE_BACKEND";
pub const DATABASE_URL_ENV: &str = "SNIP_DATABASE_URL";
pub const DEBUG_ENV: &str = "SNIP_DEBUG";
pub const MIN_KEY_LENGTH_ENV: &str = "SNIP_MIN_KEY_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "SNIP_MAX_ATTEMPTS";
pub const RESERVED_ENV: &str = "SNIP_RESERVED";
pub const LOG_FORMAT_ENV: &str = "SNIP_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "sqlite")]
    Sqlite,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snip-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    /// e.g. `sqlite:///tmp/urls.db`
    #[arg(long, env = DATABASE_URL_ENV, required_if_eq("storage", "sqlite"))]
    pub database_url: Option<String>,

    /// Serve the `/all` listing. Do not enable in production.
    #[arg(long, env = DEBUG_ENV, value_parser = BoolishValueParser::new())]
    pub debug: bool,

    #[arg(long, env = MIN_KEY_LENGTH_ENV, default_value_t = MIN_KEY_LENGTH)]
    pub min_key_length: usize,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Extra short keys that must never be generated, comma separated.
    #[arg(long, env = RESERVED_ENV, value_delimiter = ',')]
    pub reserved: Vec<String>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_from_env() {
        let off = CLI::try_parse_from(["gateway"]).unwrap();

        std::env::set_var(DEBUG_ENV, "1");
        let numeric = CLI::try_parse_from(["gateway"]);
        std::env::set_var(DEBUG_ENV, "no");
        let word = CLI::try_parse_from(["gateway"]);
        std::env::remove_var(DEBUG_ENV);

        assert!(!off.debug);
        assert!(numeric.unwrap().debug);
        assert!(!word.unwrap().debug);
    }

    #[test]
    fn debug_flag_on_command_line() {
        let cli = CLI::try_parse_from(["gateway", "--debug"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn reserved_keys_split_on_commas() {
        let cli = CLI::try_parse_from(["gateway", "--reserved", "admin,login"]).unwrap();
        assert_eq!(cli.reserved, vec!["admin".to_string(), "login".to_string()]);
    }
}
