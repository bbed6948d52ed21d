//! tba-export - TBA animation export tool
//!
//! Retargets glTF/GLB (or JSON rig) animation clips onto a target skeleton
//! and writes them as compressed `.tba` containers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tba_common::retarget::{DEFAULT_BONE_PREFIX, DEFAULT_HIP_BONE, DEFAULT_SCALE};
use tba_common::{load_tba_container, BoneNameMap, RetargetOptions, FORMAT_VERSION};

// Use modules from library
use tba_export::{animation, build, manifest, skeleton, AnimationSelector, BuildJob};

#[derive(Parser)]
#[command(name = "tba-export")]
#[command(about = "TBA animation export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retarget one clip onto a target model
    Build {
        /// Source rig with the clip (glTF/GLB/JSON)
        source: PathBuf,

        /// Target rig whose skeleton the clip should drive (glTF/GLB/JSON)
        #[arg(short, long)]
        target: PathBuf,

        /// Output .tba file (default: <name or "animation">.tba next to the source)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Animation name or index (default: first animation)
        #[arg(short, long)]
        animation: Option<String>,

        /// Source hip bone name
        #[arg(long, default_value = DEFAULT_HIP_BONE)]
        hip: String,

        /// Scale applied to hip translation
        #[arg(long, default_value_t = DEFAULT_SCALE)]
        scale: f64,

        /// Axes taking source hip motion (e.g. "xz", "none")
        #[arg(long, default_value = "xyz")]
        hip_influence: String,

        /// Prefix mapping target bone names to source bone names
        #[arg(long, default_value = DEFAULT_BONE_PREFIX)]
        bone_prefix: String,

        /// Output clip name (default: the source clip's name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Build every clip of a manifest file
    Batch {
        /// Path to tba.toml manifest
        #[arg(default_value = "tba.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to tba.toml manifest
        #[arg(default_value = "tba.toml")]
        manifest: PathBuf,
    },

    /// Decode a .tba file and describe it
    Inspect {
        /// Input .tba file
        input: PathBuf,

        /// Print the decoded container as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// List animations and skins in a glTF file
    List {
        /// Input glTF/GLB file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging (stderr keeps stdout free for --json)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            source,
            target,
            output,
            animation,
            hip,
            scale,
            hip_influence,
            bone_prefix,
            name,
        } => {
            let output =
                output.unwrap_or_else(|| build::default_output(&source, name.as_deref()));
            let options = RetargetOptions {
                hip_bone_name: hip,
                scale,
                hip_influence: RetargetOptions::parse_hip_influence(&hip_influence)?,
                bone_name_map: if bone_prefix.is_empty() {
                    BoneNameMap::Identity
                } else {
                    BoneNameMap::Prefix(bone_prefix)
                },
                name_override: name,
            };
            tracing::info!("Converting {:?} -> {:?}", source, output);

            build::run(&BuildJob {
                source,
                target,
                output,
                animation: animation.as_deref().map(AnimationSelector::from),
                options,
            })?;
            tracing::info!("Done!");
        }

        Commands::Batch {
            manifest: path,
            output,
        } => {
            tracing::info!("Building clips from {:?}", path);
            let config = manifest::load_manifest(&path)?;
            manifest::build_all(&config, &manifest::manifest_dir(&path), output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest: path } => {
            tracing::info!("Checking manifest {:?}", path);
            let config = manifest::load_manifest(&path)?;
            config.validate()?;
            config.check_files(&manifest::manifest_dir(&path))?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Inspect { input, json } => {
            let bytes =
                std::fs::read(&input).with_context(|| format!("Failed to read {:?}", input))?;
            let container = load_tba_container(&bytes)
                .with_context(|| format!("Failed to decode {:?}", input))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&container)?);
            } else {
                let clip = &container.clip;
                tracing::info!(
                    "{:?}: version {}{}",
                    input,
                    container.version,
                    if container.is_compatible_with(FORMAT_VERSION) {
                        ""
                    } else {
                        " (newer or unknown format version)"
                    }
                );
                tracing::info!(
                    "Clip '{}': {:.2}s, {} tracks, {} keyframes",
                    clip.name,
                    clip.duration,
                    clip.track_count(),
                    clip.keyframe_count()
                );
                for track in &clip.tracks {
                    tracing::info!(
                        "  {}: {} keyframes, {}",
                        track.label(),
                        track.keyframe_count(),
                        track.interpolation
                    );
                }
            }
        }

        Commands::List { input } => {
            animation::list_animations(&input)?;
            skeleton::list_skins(&input)?;
        }
    }

    Ok(())
}
