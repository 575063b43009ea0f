use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::FileCredentialStore;

/// ServEase customer client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL (e.g. https://api.example.com/api/v1)
    #[arg(short = 'u', long, env = "SERVEASE_API_URL")]
    pub api_url: Option<String>,

    /// Path of the credential file
    #[arg(short = 't', long, env = "SERVEASE_TOKEN_FILE")]
    pub token_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a sign-in; the backend usually answers with a 2FA challenge
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Finish sign-in with the one-time code and store the issued tokens
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },

    /// Forget the stored tokens
    SignOut,

    /// Show the signed-in customer's profile
    Profile,

    /// List active services
    Services {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a single service
    Service { id: String },

    /// List service categories
    Categories,

    /// List service providers
    Providers {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List the customer's bookings
    Bookings,

    /// Book a service
    Book {
        #[arg(long)]
        service: String,
        /// RFC 3339 timestamp, e.g. 2025-11-03T09:30:00Z
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        address: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    // Backend
    pub api_url: String,

    // Credentials
    pub token_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        let command = args.command.clone();
        Ok((Self::from_args(args), command))
    }

    /// Resolve configuration from parsed arguments plus the remaining env-only settings
    pub fn from_args(args: CliArgs) -> Self {
        Config {
            // A missing base URL is a deployment problem; requests will fail, nothing more
            api_url: args
                .api_url
                .or_else(|| std::env::var("EXPO_PUBLIC_API_URL").ok())
                .map(|s| normalize_base_url(&s))
                .unwrap_or_default(),

            token_file: args
                .token_file
                .map(|s| expand_tilde(&s))
                .unwrap_or_else(FileCredentialStore::default_path),

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            http_request_timeout: args.http_timeout,

            log_level: args.log_level,
            log_json: args.log_json,
        }
    }
}

/// Trim whitespace and a single trailing slash
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/servease/credentials.json");
        assert!(path.to_string_lossy().contains("servease/credentials.json"));
        assert!(!path.to_string_lossy().starts_with("~"));

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_tilde_just_tilde() {
        // Just "~" without slash should not expand
        let path = expand_tilde("~");
        assert_eq!(path, PathBuf::from("~"));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:3000/api/v1/"),
            "http://localhost:3000/api/v1"
        );
        assert_eq!(normalize_base_url(" http://x.test "), "http://x.test");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_from_args_cli_values() {
        let args = parse(&[
            "servease",
            "--api-url",
            "http://localhost:3000/api/v1/",
            "--token-file",
            "/tmp/creds.json",
            "--http-timeout",
            "5",
            "profile",
        ]);
        assert_eq!(args.command, Command::Profile);

        let config = Config::from_args(args);
        assert_eq!(config.api_url, "http://localhost:3000/api/v1");
        assert_eq!(config.token_file, PathBuf::from("/tmp/creds.json"));
        assert_eq!(config.http_request_timeout, 5);
    }

    #[test]
    fn test_log_json_flag() {
        let config = Config::from_args(parse(&["servease", "--log-json", "categories"]));
        assert!(config.log_json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_parse_subcommands() {
        let args = parse(&["servease", "services", "--limit", "8", "--category", "c1"]);
        assert_eq!(
            args.command,
            Command::Services {
                limit: Some(8),
                category: Some("c1".to_string())
            }
        );

        let args = parse(&["servease", "service", "svc-1"]);
        assert_eq!(
            args.command,
            Command::Service {
                id: "svc-1".to_string()
            }
        );

        let args = parse(&[
            "servease",
            "book",
            "--service",
            "svc-1",
            "--schedule",
            "2025-11-03T09:30:00Z",
            "--address",
            "12 Rizal St",
        ]);
        assert!(matches!(args.command, Command::Book { .. }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliArgs::try_parse_from(["servease"]).is_err());
    }
}
