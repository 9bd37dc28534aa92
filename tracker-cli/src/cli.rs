use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "release-tracker")]
#[command(about = "Release tracker server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Create or update the database schema, then exit
    Migrate {
        /// SQLite connection string, e.g. sqlite://tracker.db
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite connection string; the in-memory store is used when absent
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Slack incoming webhook for release-completed messages
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook_url: Option<String>,

    /// Origins allowed to call the API from a browser (all when empty)
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// OTLP collector endpoint, e.g. http://localhost:4317
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Deliver notifications before answering the triggering request
    #[arg(long, env = "INLINE_NOTIFICATIONS")]
    pub inline_notifications: bool,
}

impl ServeArgs {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
