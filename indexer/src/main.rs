use anyhow::Result;
use clap::{Parser, Subcommand};
use evidex_core::{build_index, corpus, persist, LinkGraph};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build index and link-graph snapshots from a corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the TF-IDF index snapshot
    Build {
        /// Corpus file or directory of corpus files
        #[arg(long)]
        corpus: String,
        /// Output index snapshot file
        #[arg(long, default_value = "./data/index.json")]
        output: String,
    },
    /// Build the link graph snapshot with HITS scores
    Graph {
        /// Corpus file or directory of corpus files
        #[arg(long)]
        corpus: String,
        /// Output graph snapshot file
        #[arg(long, default_value = "./data/graph.json")]
        output: String,
        /// HITS iteration count
        #[arg(long, default_value_t = 20)]
        iterations: usize,
        /// Optional early stop once the largest score delta falls below this
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, output } => {
            let documents = corpus::load_path(Path::new(&corpus))?;
            tracing::info!(documents = documents.len(), "corpus loaded");
            let snapshot = build_index(&documents);
            persist::save_json(Path::new(&output), &snapshot)?;
            tracing::info!(output = %output, "index snapshot written");
        }
        Commands::Graph {
            corpus,
            output,
            iterations,
            tolerance,
        } => {
            let documents = corpus::load_path(Path::new(&corpus))?;
            tracing::info!(documents = documents.len(), "corpus loaded");
            let mut graph = LinkGraph::build(&documents);
            graph.rank(iterations, tolerance);
            persist::save_json(Path::new(&output), &graph)?;
            tracing::info!(output = %output, "graph snapshot written");
        }
    }
    Ok(())
}
