use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use rayon::prelude::*;

use graph_cluster_engine::config::{self, Algorithm, ClusteringSettings};
use graph_cluster_engine::graph::GraphView;
use graph_cluster_engine::{data, storage, viz, ClusteringSession};

#[derive(Parser, Debug)]
#[clap(
    name = "graph-cluster-engine",
    about = "Cohesion-aware community detection over document graphs"
)]
struct Cli {
    /// Graph snapshot: a JSON file, or a Parquet link table
    #[clap(long)]
    input: String,

    /// Parquet node table accompanying a Parquet link table
    #[clap(long)]
    nodes: Option<String>,

    /// JSON settings file
    #[clap(long)]
    settings: Option<String>,

    /// Detection strategy (louvain, agglomerative, hybrid)
    #[clap(long)]
    algorithm: Option<Algorithm>,

    /// Minimum cluster size
    #[clap(long)]
    min_cluster_size: Option<usize>,

    /// Maximum number of clusters
    #[clap(long)]
    max_clusters: Option<usize>,

    /// Modularity resolution
    #[clap(long)]
    resolution: Option<f64>,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: String,

    /// Skip renderer export files
    #[clap(long)]
    skip_export: bool,

    /// Run every strategy and report their quality side by side
    #[clap(long)]
    compare: bool,

    /// Number of worker threads for --compare (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Attach the debug payload to results
    #[clap(long)]
    debug: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    /// Settings file (or defaults) with command-line overrides applied
    fn settings(&self) -> Result<ClusteringSettings> {
        let mut settings = match &self.settings {
            Some(path) => config::load_settings(path)?,
            None => ClusteringSettings::default(),
        };

        if let Some(algorithm) = self.algorithm {
            settings.algorithm = algorithm;
        }
        if let Some(min) = self.min_cluster_size {
            settings.min_cluster_size = min;
        }
        if let Some(max) = self.max_clusters {
            settings.max_clusters = max;
        }
        if let Some(resolution) = self.resolution {
            settings.resolution = resolution;
        }
        settings.debug_mode |= self.debug;

        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let settings = args.settings()?;

    log::info!("Starting graph clustering");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load snapshot
    let snapshot = data::load_snapshot(&args.input, args.nodes.as_deref())?;

    // 2. Optionally compare strategies
    if args.compare {
        let num_threads = if args.threads > 0 { args.threads } else { num_cpus::get() };
        log::info!("Comparing strategies on {} worker threads", num_threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;

        let now = Utc::now();
        let runs: Vec<_> = Algorithm::ALL
            .par_iter()
            .map(|&algorithm| {
                let candidate = ClusteringSettings {
                    algorithm,
                    ..settings.clone()
                };
                (algorithm, graph_cluster_engine::cluster_snapshot(&snapshot, &candidate, now))
            })
            .collect();

        for (algorithm, run) in runs {
            let result = run?;
            log::info!(
                "{:>13}: {} clusters, modularity {:.4}, coverage {:.4}, {} orphans",
                algorithm.as_str(),
                result.clusters.len(),
                result.modularity,
                result.coverage,
                result.orphan_nodes.len()
            );
        }
    }

    // 3. Cluster with the configured strategy
    let mut session = ClusteringSession::new(settings);
    let result = session.cluster_graph(&snapshot)?;

    // 4. Save results
    storage::save_results(&result, &snapshot, session.settings(), &args.output_dir)?;

    // 5. Export for renderers if requested
    if !args.skip_export {
        let view = GraphView::new(&snapshot)?;
        viz::export_for_renderers(&result, &view, &args.output_dir)?;
    }

    log::info!("Clustering complete. Results saved to {}", args.output_dir);

    Ok(())
}
