use anyhow::Result;
use axum::Router;
use clap::Parser;
use evidex_core::SearchOptions;
use evidex_server::build_app;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index snapshot file
    #[arg(long, default_value = "./data/index.json")]
    index: String,
    /// Link graph snapshot file (optional; ranking degrades without it)
    #[arg(long)]
    graph: Option<String>,
    /// Corpus file or directory, used to serve document bodies and evidence
    #[arg(long)]
    corpus: Option<String>,
    /// Default content/graph blend
    #[arg(long, default_value_t = 0.85)]
    alpha: f64,
    /// Calibration factor applied to graph-authority scores
    #[arg(long, default_value_t = 20.0)]
    graph_scale: f64,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let defaults = SearchOptions {
        alpha: args.alpha,
        graph_scale: args.graph_scale,
        ..SearchOptions::default()
    };
    let app: Router = build_app(
        Path::new(&args.index),
        args.graph.as_deref().map(Path::new),
        args.corpus.as_deref().map(Path::new),
        defaults,
    )?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
