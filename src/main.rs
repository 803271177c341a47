use clap::{Parser, ValueEnum};
use creditx_api::{RestApi, ServiceState};
use creditx_core::{ImputationPolicy, ServiceConfig, DEFAULT_TOP_K};
use creditx_storage::ArtifactManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Imputation {
    None,
    Complete,
    All,
}

impl From<Imputation> for ImputationPolicy {
    fn from(value: Imputation) -> Self {
        match value {
            Imputation::None => ImputationPolicy::None,
            Imputation::Complete => ImputationPolicy::Complete,
            Imputation::All => ImputationPolicy::All,
        }
    }
}

/// Credit-default scoring service
#[derive(Parser, Debug)]
#[command(name = "creditx")]
#[command(about = "Serve accept/reject decisions and explanations from a trained credit model", long_about = None)]
struct Args {
    /// Directory holding feature_columns.json, model.json and optional artifacts
    #[arg(short, long, env = "CREDITX_MODEL_DIR", default_value = "./models")]
    model_dir: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "CREDITX_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Decision threshold overriding the artifacts
    #[arg(long)]
    threshold: Option<f64>,

    /// Attributions returned by the explain endpoints
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Which request variants go through the imputer
    #[arg(long, value_enum, default_value_t = Imputation::None)]
    imputation: Imputation,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting creditx v{}", env!("CARGO_PKG_VERSION"));
    info!("Model directory: {:?}", args.model_dir);
    info!("HTTP API port: {}", args.http_port);

    let config = ServiceConfig {
        threshold: args.threshold,
        top_k: args.top_k,
        imputation: args.imputation.into(),
    };

    let state = match ArtifactManager::new(&args.model_dir).load(&config) {
        Ok(artifacts) => {
            info!(
                "Model ready: {} over {} features",
                artifacts.model_type,
                artifacts.context.schema().len()
            );
            ServiceState::ready(artifacts)
        }
        Err(e) => {
            error!(kind = e.kind(), "Failed to load model artifacts: {}", e);
            ServiceState::unavailable(e.to_string())
        }
    };
    let state = Arc::new(state);

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
