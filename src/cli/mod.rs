//! CLI layer: argument parsing, command dispatch, and the `build` subcommand.

pub mod args;

pub use args::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use estk_dts::{convert, recovery::Blob, ConversionError};

/// Recovers TypeScript declarations from corrupted Adobe ExtendScript API XML.
#[derive(Parser, Debug)]
#[command(
    name = "estk-dts",
    version,
    about,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")")
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Convert an XML definition (and optional binaries) into a `.d.ts` file.
    Build(BuildArgs),
}

pub fn run() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build(args) => cmd_build(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(exit_code(&e));
    }
}

pub(crate) fn exit_code(err: &ConversionError) -> i32 {
    match err {
        ConversionError::Io { .. } | ConversionError::InvalidArgs(_) | ConversionError::NoBlobsFound { .. } => 2,
        ConversionError::MalformedXml(_)
        | ConversionError::UnknownDefinitionKind { .. }
        | ConversionError::UnknownMemberKind { .. } => 1,
    }
}

pub(crate) fn cmd_build(args: BuildArgs) -> Result<(), ConversionError> {
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let start = Instant::now();

    let xml_text = read_to_string(&args.xml)?;

    let blob_paths = collect_blob_paths(&args)?;
    if args.require_blobs && blob_paths.is_empty() {
        let dir = args
            .blob_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(none given)".to_string());
        return Err(ConversionError::NoBlobsFound { dir });
    }
    let blob_bytes: Vec<Vec<u8>> = blob_paths.iter().map(|p| read_bytes(p)).collect::<Result<_, _>>()?;
    let blobs: Vec<Blob> = blob_paths
        .iter()
        .zip(&blob_bytes)
        .map(|(path, bytes)| Blob {
            name: path.to_str().unwrap_or(""),
            bytes,
        })
        .collect();

    tracing::info!(blobs = blobs.len(), xml = %args.xml.display(), "starting conversion");

    let output = convert(&xml_text, &blobs)?;

    match &args.out {
        Some(path) => {
            fs::write(path, &output).map_err(|source| ConversionError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        None => {
            print!("{output}");
        }
    }

    eprintln!(
        "Converted {} with {} blob(s) in {:.3}s",
        args.xml.display(),
        blobs.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Explicit `--blob` files first, then every regular file in `--blob-dir`,
/// sorted by file name for determinism.
pub(crate) fn collect_blob_paths(args: &BuildArgs) -> Result<Vec<PathBuf>, ConversionError> {
    let mut paths = args.blobs.clone();

    if let Some(dir) = &args.blob_dir {
        let entries = fs::read_dir(dir).map_err(|source| ConversionError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut dir_paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConversionError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                dir_paths.push(entry.path());
            }
        }
        dir_paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        paths.extend(dir_paths);
    }

    Ok(paths)
}

fn read_to_string(path: &Path) -> Result<String, ConversionError> {
    fs::read_to_string(path).map_err(|source| ConversionError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ConversionError> {
    fs::read(path).map_err(|source| ConversionError::Io {
        path: path.display().to_string(),
        source,
    })
}
