//! Single clip conversion: source rig + target rig -> `.tba`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use tba_common::{build_tba_report, BuildReport, RetargetOptions, FORMAT_VERSION, TBA_EXT};

use crate::animation::AnimationSelector;
use crate::rig::load_rig;

/// File stem used when no clip name is given
pub const DEFAULT_OUTPUT_STEM: &str = "animation";

/// Everything needed to produce one `.tba` file
#[derive(Debug, Clone)]
pub struct BuildJob {
    /// Rig carrying the source skeleton and clip
    pub source: PathBuf,
    /// Rig carrying the target skeleton
    pub target: PathBuf,
    pub output: PathBuf,
    pub animation: Option<AnimationSelector>,
    pub options: RetargetOptions,
}

/// Default output path: `<name or "animation">.tba` next to `source`
pub fn default_output(source: &Path, name: Option<&str>) -> PathBuf {
    let stem = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_OUTPUT_STEM);
    source.with_file_name(format!("{}.{}", stem, TBA_EXT))
}

/// Import, retarget, encode and write one clip
pub fn run(job: &BuildJob) -> Result<BuildReport> {
    let (source_skeleton, source_clip) = load_rig(&job.source, true, job.animation.as_ref())?
        .into_clip(&job.source)?;
    let target = load_rig(&job.target, false, None)?;

    let report = build_tba_report(
        &source_clip,
        &source_skeleton,
        &target.skeleton,
        &job.options,
        FORMAT_VERSION,
    )
    .with_context(|| format!("Failed to build {:?} onto {:?}", job.source, job.target))?;

    if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    std::fs::write(&job.output, &report.bytes)
        .with_context(|| format!("Failed to write output: {:?}", job.output))?;

    tracing::info!(
        "Exported '{}': {} tracks, {:.2}s, {} bytes ({:.1}% of {} bytes), verified in {:.2?}",
        report.clip.name,
        report.clip.track_count(),
        report.clip.duration,
        report.stats.compressed_size,
        report.stats.ratio,
        report.stats.structured_size,
        report.verify_time
    );

    Ok(report)
}
