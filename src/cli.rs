use clap::{Parser, Subcommand, ValueEnum};

use model_client::Backend;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a one-off message and print the reply
    Ask {
        /// The message to send
        #[arg(required = true)]
        message: Vec<String>,

        /// Backend to send the request to
        #[arg(short, long, value_enum, default_value_t = BackendArg::Mock)]
        backend: BackendArg,

        /// Model to request; vllm falls back to VLLM_MODEL when empty
        #[arg(short, long, default_value = "")]
        model: String,

        /// Optional system prompt sent before the message
        #[arg(short, long)]
        system: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the configuration resolved from the environment
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Mock,
    Vllm,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mock => Backend::Mock,
            BackendArg::Vllm => Backend::Vllm,
        }
    }
}
