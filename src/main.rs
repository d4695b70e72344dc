mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use model_client::{create_client, AppConfig, Backend, Message, ModelRequest};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to resolve configuration")?;

    match cli.command {
        Commands::Ask {
            message,
            backend,
            model,
            system,
            temperature,
            max_tokens,
            json,
        } => {
            let backend = Backend::from(backend);

            let mut builder = ModelRequest::builder(model);
            if let Some(system) = system {
                builder = builder.message(Message::system(system));
            }
            builder = builder.message(Message::user(message.join(" ")));
            if let Some(temperature) = temperature {
                builder = builder.temperature(temperature);
            }
            if let Some(max_tokens) = max_tokens {
                builder = builder.max_tokens(max_tokens);
            }
            let request = builder.build()?;

            let client = create_client(backend, &config)?;
            debug!(%backend, model = request.model(), "sending chat request");
            let response = client
                .chat(&request)
                .await
                .with_context(|| format!("{backend} backend request failed"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.output_text());
                let usage = response.usage();
                eprintln!(
                    "\n[{}] prompt={} completion={} total={}",
                    response.model(),
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens
                );
            }
        }
        Commands::Config => {
            println!("mock server url:   {}", config.mock.base_url);
            println!("mock server bind:  {}", config.mock_server_addr);
            println!("vllm server url:   {}", config.vllm.base_url);
            println!(
                "vllm model:        {}",
                if config.vllm.default_model.is_empty() {
                    "(none)"
                } else {
                    config.vllm.default_model.as_str()
                }
            );
            println!("vllm streaming:    {}", config.vllm.streaming);
            println!("timeout:           {}s", config.vllm.timeout.as_secs());
            for name in config.vllm.headers.keys() {
                println!("vllm header:       {name}: <redacted>");
            }
        }
    }

    Ok(())
}
