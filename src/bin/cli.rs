//! kvstash CLI
//!
//! Command-line interface for saving, loading and inspecting artifacts in a
//! file-backed store, and for transcoding images.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kvstash::artifact::{ArtifactPayload, ArtifactStore, Structure};
use kvstash::config::{Config, DEFAULT_NAMESPACE, DEFAULT_PARTITION_COUNT};
use kvstash::{transcode, FileBackend, RasterBuffer, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// kvstash CLI
#[derive(Parser, Debug)]
#[command(name = "kvstash-cli")]
#[command(about = "Partitioned artifact storage and pixel transcoding")]
#[command(version)]
struct Args {
    /// Data directory of the file backend
    #[arg(short, long, default_value = "./kvstash_data")]
    data_dir: PathBuf,

    /// Key namespace
    #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Number of weight partitions
    #[arg(short, long, default_value_t = DEFAULT_PARTITION_COUNT)]
    partitions: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save an artifact from a JSON structure file and a weights file
    Save {
        /// Artifact name
        name: String,

        /// JSON file holding the structure (topology, weight specs, ...)
        #[arg(long)]
        structure: PathBuf,

        /// Raw weight bytes
        #[arg(long)]
        weights: PathBuf,
    },

    /// Load an artifact and write its parts to disk
    Load {
        /// Artifact name
        name: String,

        /// Where to write the structure JSON
        #[arg(long)]
        structure_out: PathBuf,

        /// Where to write the weight bytes
        #[arg(long)]
        weights_out: PathBuf,
    },

    /// Print whether an artifact exists
    Exists {
        /// Artifact name
        name: String,
    },

    /// Print an artifact's metadata record
    Info {
        /// Artifact name
        name: String,
    },

    /// Delete an artifact
    Delete {
        /// Artifact name
        name: String,
    },

    /// Rewrite the backend log with only live entries
    Compact,

    /// Decode an image and write its packed RGB bytes
    Transcode {
        /// PNG or JPEG input
        image: PathBuf,

        /// Output file for the raw RGB buffer
        out: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvstash=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .namespace(&args.namespace)
        .partition_count(args.partitions)
        .build();

    let open_store = |name: String| -> Result<ArtifactStore<FileBackend>> {
        let backend = FileBackend::open(&config)?;
        ArtifactStore::with_config(backend, name, &config)
    };

    match args.command {
        Commands::Save {
            name,
            structure,
            weights,
        } => {
            let structure: serde_json::Value = serde_json::from_slice(&fs::read(&structure)?)?;
            let payload = ArtifactPayload::new(structure, fs::read(&weights)?);

            let store = open_store(name)?;
            let info = store.save(&payload)?;
            store.backend().sync()?;
            println!("{}", info.to_json()?);
        }
        Commands::Load {
            name,
            structure_out,
            weights_out,
        } => {
            let payload = open_store(name)?.load()?;
            if let Structure::Structured(value) = &payload.structure {
                fs::write(&structure_out, serde_json::to_vec_pretty(value)?)?;
            }
            fs::write(&weights_out, &payload.weight_bytes)?;
            println!("{} weight bytes", payload.weight_bytes.len());
        }
        Commands::Exists { name } => {
            println!("{}", open_store(name)?.exists()?);
        }
        Commands::Info { name } => {
            let store = open_store(name)?;
            match store.info()? {
                Some(info) => println!("{}", info.to_json()?),
                None => println!("(not found)"),
            }
        }
        Commands::Delete { name } => {
            let store = open_store(name)?;
            store.delete()?;
            store.backend().sync()?;
        }
        Commands::Compact => {
            let backend = FileBackend::open(&config)?;
            backend.compact()?;
            tracing::info!(live_keys = backend.len(), "compaction finished");
        }
        Commands::Transcode { image, out } => {
            let raster = RasterBuffer::decode(&fs::read(&image)?)?;
            let tensor = transcode(&raster)?;
            fs::write(&out, tensor.as_bytes())?;
            let [h, w, c] = tensor.shape();
            println!("[{}, {}, {}]", h, w, c);
        }
    }

    Ok(())
}
