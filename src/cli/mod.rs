use clap::{Parser, Subcommand};

/// CodeGraph - property-graph code indexing and hybrid search (spec §6).
#[derive(Parser)]
#[command(name = "codegraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the data directory
    #[arg(short, long, global = true, default_value = "~/.codegraph")]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan, parse, and ingest a workspace into the graph
    Index {
        /// Path to the directory to index
        dir: String,

        /// Re-process every matching file, ignoring stored checksums
        #[arg(long)]
        force: bool,

        /// Override the parser subprocess fan-out for this run
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Run hierarchical summarization and embedding over the graph
    Summarize,

    /// Report summarization/embedding progress and graph statistics
    Status,

    /// Clear stale processing leases, or wipe the graph entirely with --confirm
    Reset {
        #[arg(long)]
        confirm: bool,
    },

    /// Run a hybrid search query
    Search {
        query: String,

        #[arg(short, long, default_value = "10")]
        num: usize,

        /// Minimum vector-similarity threshold (spec §4.6's `min_similarity_threshold`)
        #[arg(long)]
        min_score: Option<f32>,

        /// Restrict results to one or more node types (repeatable), e.g. `--node-type Class`
        #[arg(long = "node-type")]
        node_type: Vec<String>,

        /// Expand graph context around the top results
        #[arg(long)]
        context: bool,

        /// Fold call-hierarchy counts into the expanded context
        #[arg(long)]
        call_hierarchy: bool,

        /// Fold inheritance-hierarchy counts into the expanded context
        #[arg(long)]
        inheritance: bool,
    },

    /// Run a search query and print the scoring rationale for each result
    Explain { query: String },

    /// Serve the search facade over HTTP
    Api {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },
}
