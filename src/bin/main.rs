use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use travel_orchestrator::{
    ChatConfig, ChatReasoner, Orchestrator, PipelineOptions, ProviderConfig, SerpApiProvider,
    create_orchestrator, load_crew_config,
};

#[derive(Parser)]
#[command(name = "travel-orchestrator")]
#[command(about = "Multi-worker travel planning pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Server {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, default_value = "0.0.0.0:8080", env = "TRAVEL_BIND")]
        bind: String,
        #[command(flatten)]
        runtime: RuntimeArgs,
    },
    /// Plan a single trip and print the rendered result
    Plan {
        /// The traveller's request
        message: String,
        #[command(flatten)]
        runtime: RuntimeArgs,
    },
    /// Print the resolved worker and task definitions
    ShowConfig,
}

#[derive(Args)]
struct RuntimeArgs {
    /// Search provider API key
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    serpapi_key: Option<String>,
    /// Search provider endpoint
    #[arg(long, env = "SERPAPI_URL", default_value = "https://serpapi.com/search.json")]
    serpapi_url: String,
    /// Timeout for provider calls, in seconds
    #[arg(long, env = "SERPAPI_TIMEOUT_SECS", default_value_t = 30)]
    serpapi_timeout_secs: u64,
    /// Chat-completions API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,
    /// Chat-completions endpoint
    #[arg(
        long,
        env = "OPENAI_CHAT_URL",
        default_value = "https://api.openai.com/v1/chat/completions"
    )]
    chat_url: String,
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,
    /// Maximum model round trips per unit
    #[arg(long, default_value_t = 8)]
    max_iterations: usize,
    /// Timeout for chat-completions calls, in seconds
    #[arg(long, default_value_t = 120)]
    chat_timeout_secs: u64,
    /// Run flight and hotel research concurrently
    #[arg(long, env = "TRAVEL_PARALLEL_RESEARCH", default_value_t = false)]
    parallel_research: bool,
    /// Reject plans whose total cost disagrees with referenced prices
    #[arg(long, env = "TRAVEL_STRICT_COST_CHECK", default_value_t = false)]
    strict_cost_check: bool,
}

impl RuntimeArgs {
    fn build(self) -> Result<Arc<Orchestrator>> {
        let crew = load_crew_config()?;

        let provider = SerpApiProvider::new(ProviderConfig {
            base_url: self.serpapi_url,
            api_key: self.serpapi_key,
            timeout: Duration::from_secs(self.serpapi_timeout_secs),
        })?;

        let reasoner = ChatReasoner::new(ChatConfig {
            endpoint: self.chat_url,
            api_key: self.openai_key,
            model: self.model,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.chat_timeout_secs),
            max_iterations: self.max_iterations,
        })?;

        let options = PipelineOptions {
            parallel_independent: self.parallel_research,
            strict_cost_check: self.strict_cost_check,
        };

        Ok(create_orchestrator(
            &crew,
            Arc::new(provider),
            Arc::new(reasoner),
            options,
        )?)
    }
}

const DEFAULT_LOG_FILTER: &str = "travel_orchestrator=info,hyper=warn";

/// `RUST_LOG` when it parses, otherwise the crate's info-level default.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { bind, runtime } => {
            let orchestrator = runtime.build()?;
            let app = travel_orchestrator::api::create_router(orchestrator);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Travel orchestrator listening on http://{}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Plan { message, runtime } => {
            let orchestrator = runtime.build()?;
            let timestamp = chrono::Utc::now().to_rfc3339();
            let rendered = orchestrator.run(&message, &timestamp).await?;
            println!("{}", rendered);
        }
        Commands::ShowConfig => {
            let crew = load_crew_config()?;
            println!("{}", serde_json::to_string_pretty(&crew)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_honours_rust_log() {
        let filter = log_filter(Some("travel_orchestrator=debug")).to_string();
        assert!(filter.contains("travel_orchestrator=debug"));
        assert!(!filter.contains("travel_orchestrator=info"));
    }

    #[test]
    fn test_log_filter_default() {
        let filter = log_filter(None).to_string();
        assert!(filter.contains("travel_orchestrator=info"));
        assert!(filter.contains("hyper=warn"));
    }
}
