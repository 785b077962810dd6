use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sprig", version, about = "🌱 Sprig — habit coaching gateway")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start the coaching gateway daemon.
    Start,
    /// Chat with a running gateway from the terminal.
    Chat {
        /// User id to chat as.
        #[arg(short, long, default_value = "local")]
        user: String,
    },
    /// Validate the config without starting.
    Check,
    Version,
}
