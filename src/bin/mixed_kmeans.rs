//! Command-line front end for mixed k-means clustering.
//!
//! ## Usage
//!
//! ```bash
//! # Cluster a CSV file into 3 groups and print the detailed report
//! mixed-kmeans learn data/weather.csv --k 3 --seed 42
//!
//! # Same, reading the configuration from JSON and saving the model
//! mixed-kmeans learn data/weather.csv --config kmeans.json --save weather3 --models models/
//!
//! # Print the summary of a saved model
//! mixed-kmeans show weather3 --models models/
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mixed_kmeans_rs::{
    load_csv, render_clusters, render_summary, FileModelStore, KMeansConfig, MixedKMeans,
    ModelStore,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mixed-kmeans")]
#[command(about = "Cluster tabular data with mixed continuous and categorical columns")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster a CSV file (header row required)
    Learn {
        /// Input CSV file.
        input: PathBuf,

        /// JSON file with a KMeansConfig; flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of clusters.
        #[arg(long)]
        k: Option<usize>,

        /// Random seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of passes.
        #[arg(long)]
        max_iters: Option<usize>,

        /// Save the model under this key.
        #[arg(long)]
        save: Option<String>,

        /// Directory holding saved models.
        #[arg(long, default_value = "models")]
        models: PathBuf,
    },

    /// Print the summary of a saved model
    Show {
        /// Key the model was saved under.
        key: String,

        /// Directory holding saved models.
        #[arg(long, default_value = "models")]
        models: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Learn {
            input,
            config,
            k,
            seed,
            max_iters,
            save,
            models,
        } => {
            let mut kmeans_config = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading config {:?}", path))?;
                    serde_json::from_str::<KMeansConfig>(&text)
                        .with_context(|| format!("parsing config {:?}", path))?
                }
                None => KMeansConfig::default(),
            };
            if let Some(k) = k {
                kmeans_config.k = k;
            }
            if let Some(seed) = seed {
                kmeans_config.seed = Some(seed);
            }
            if let Some(max_iters) = max_iters {
                kmeans_config.max_iters = max_iters;
            }
            kmeans_config.verbose |= args.verbose;

            let data = load_csv(&input).with_context(|| format!("loading {:?}", input))?;

            let mut kmeans = MixedKMeans::with_config(kmeans_config);
            let passes = kmeans.fit(&data)?;
            let clusters = kmeans
                .cluster_set()
                .context("no clusters after fitting")?;

            println!("Number of passes: {}", passes);
            if !kmeans.converged() {
                println!("Pass cap reached before convergence");
            }
            print!("{}", render_clusters(clusters, &data));

            if let Some(key) = save {
                let mut store = FileModelStore::new(&models)?;
                store.save(clusters, &key)?;
                info!("Model saved as '{}' in {:?}", key, models);
            }
        }
        Command::Show { key, models } => {
            let store = FileModelStore::new(&models)?;
            let clusters = store.load(&key)?;
            print!("{}", render_summary(&clusters));
        }
    }

    Ok(())
}
