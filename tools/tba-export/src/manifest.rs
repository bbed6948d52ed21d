//! tba.toml manifest parsing
//!
//! A manifest lists clips to retarget in one batch. Paths are relative to the
//! manifest's directory. Per-clip keys override the `[retarget]` defaults:
//!
//! ```toml
//! [output]
//! dir = "build/animations"
//!
//! [retarget]
//! target = "models/jean.glb"
//! hip_influence = "xz"
//!
//! [[clips]]
//! source = "mixamo/walk.glb"
//! name = "jean_walk"
//!
//! [[clips]]
//! source = "mixamo/idle.glb"
//! animation = "mixamo.com"
//! scale = 1.0
//! ```

use anyhow::{Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use tba_common::retarget::{DEFAULT_BONE_PREFIX, DEFAULT_HIP_BONE, DEFAULT_SCALE};
use tba_common::{BoneNameMap, BuildReport, RetargetOptions, TBA_EXT};

use crate::animation::AnimationSelector;
use crate::build::{self, BuildJob};

/// tba.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct TbaManifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub retarget: RetargetSection,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

/// Output configuration section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output directory. Default: next to each source file
    pub dir: Option<String>,
}

/// Retarget defaults shared by every clip
#[derive(Debug, Deserialize)]
pub struct RetargetSection {
    /// Target rig (glTF/GLB or JSON)
    pub target: Option<String>,

    /// Default: "mixamorigHips"
    #[serde(default = "default_hip")]
    pub hip: String,

    /// Default: 0.01
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Axes taking source hip motion. Default: "xyz"
    #[serde(default = "default_hip_influence")]
    pub hip_influence: String,

    /// Default: "mixamorig"
    #[serde(default = "default_bone_prefix")]
    pub bone_prefix: String,
}

fn default_hip() -> String {
    DEFAULT_HIP_BONE.to_string()
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_hip_influence() -> String {
    "xyz".to_string()
}

fn default_bone_prefix() -> String {
    DEFAULT_BONE_PREFIX.to_string()
}

impl Default for RetargetSection {
    fn default() -> Self {
        Self {
            target: None,
            hip: default_hip(),
            scale: default_scale(),
            hip_influence: default_hip_influence(),
            bone_prefix: default_bone_prefix(),
        }
    }
}

/// Single clip entry
#[derive(Debug, Deserialize)]
pub struct ClipEntry {
    pub source: String,

    /// Output clip name. Also names the output file; when unset the clip keeps
    /// its source name and the file is named after the source file.
    #[serde(default)]
    pub name: Option<String>,

    /// Animation name or index in the source file. Default: first animation
    #[serde(default)]
    pub animation: Option<String>,

    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub hip: Option<String>,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub hip_influence: Option<String>,
    #[serde(default)]
    pub bone_prefix: Option<String>,
}

impl ClipEntry {
    /// Output file stem
    fn stem(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => Path::new(&self.source)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(build::DEFAULT_OUTPUT_STEM)
                .to_string(),
        }
    }
}

impl TbaManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse tba.toml")
    }

    /// Resolve the retarget options of one clip
    pub fn options_for(&self, clip: &ClipEntry) -> Result<RetargetOptions> {
        let defaults = &self.retarget;
        let influence = clip
            .hip_influence
            .as_deref()
            .unwrap_or(&defaults.hip_influence);
        let prefix = clip.bone_prefix.as_deref().unwrap_or(&defaults.bone_prefix);

        let options = RetargetOptions {
            hip_bone_name: clip.hip.clone().unwrap_or_else(|| defaults.hip.clone()),
            scale: clip.scale.unwrap_or(defaults.scale),
            hip_influence: RetargetOptions::parse_hip_influence(influence)?,
            bone_name_map: if prefix.is_empty() {
                BoneNameMap::Identity
            } else {
                BoneNameMap::Prefix(prefix.to_string())
            },
            name_override: clip.name.clone(),
        };
        options.validate()?;
        Ok(options)
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        if self.clips.is_empty() {
            anyhow::bail!("No clips declared in tba.toml (add a [[clips]] entry)");
        }

        for (i, clip) in self.clips.iter().enumerate() {
            if clip.source.is_empty() {
                anyhow::bail!("Clip {} in tba.toml has an empty source", i);
            }
            if clip.target.is_none() && self.retarget.target.is_none() {
                anyhow::bail!(
                    "Clip {} ({}) has no target (set clips.target or retarget.target)",
                    i,
                    clip.source
                );
            }
            self.options_for(clip).with_context(|| {
                format!("Invalid retarget options for clip {} ({})", i, clip.source)
            })?;
        }

        self.check_outputs(Path::new(""), None)
    }

    /// Output path of one clip
    ///
    /// Without an output directory the file lands next to its source.
    pub fn output_path(
        &self,
        clip: &ClipEntry,
        base_dir: &Path,
        output_dir: Option<&Path>,
    ) -> PathBuf {
        let file_name = format!("{}.{}", clip.stem(), TBA_EXT);
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| self.output.dir.as_ref().map(|dir| base_dir.join(dir)));
        match dir {
            Some(dir) => dir.join(file_name),
            None => base_dir.join(&clip.source).with_file_name(file_name),
        }
    }

    /// Reject manifests where two clips resolve to the same output file
    fn check_outputs(&self, base_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
        let mut outputs = HashSet::new();
        for (i, clip) in self.clips.iter().enumerate() {
            let output = self.output_path(clip, base_dir, output_dir);
            if !outputs.insert(output.clone()) {
                anyhow::bail!(
                    "Clip {} ({}) writes {}, which another clip already writes",
                    i,
                    clip.source,
                    output.display()
                );
            }
        }
        Ok(())
    }

    /// Check that every referenced rig file exists under `base_dir`
    pub fn check_files(&self, base_dir: &Path) -> Result<()> {
        for clip in &self.clips {
            let target = clip.target.as_ref().or(self.retarget.target.as_ref());
            for path in std::iter::once(&clip.source).chain(target) {
                let full = base_dir.join(path);
                if !full.exists() {
                    anyhow::bail!("File not found: {}", full.display());
                }
            }
        }
        Ok(())
    }

    /// Expand every clip into a build job
    ///
    /// `output_dir` overrides the manifest's output directory.
    pub fn jobs(&self, base_dir: &Path, output_dir: Option<&Path>) -> Result<Vec<BuildJob>> {
        self.validate()?;
        self.check_outputs(base_dir, output_dir)?;

        self.clips
            .iter()
            .map(|clip| {
                let source = base_dir.join(&clip.source);
                let target = clip
                    .target
                    .as_ref()
                    .or(self.retarget.target.as_ref())
                    .map(|t| base_dir.join(t))
                    .with_context(|| format!("Clip {} has no target", clip.source))?;

                Ok(BuildJob {
                    output: self.output_path(clip, base_dir, output_dir),
                    source,
                    target,
                    animation: clip.animation.as_deref().map(AnimationSelector::from),
                    options: self.options_for(clip)?,
                })
            })
            .collect()
    }
}

/// Load manifest from file
pub fn load_manifest(path: &Path) -> Result<TbaManifest> {
    TbaManifest::load(path)
}

/// Build every clip of a manifest, stopping at the first failure
pub fn build_all(
    manifest: &TbaManifest,
    base_dir: &Path,
    output_dir: Option<&Path>,
) -> Result<Vec<BuildReport>> {
    let jobs = manifest.jobs(base_dir, output_dir)?;
    let mut reports = Vec::with_capacity(jobs.len());

    for job in &jobs {
        tracing::info!("Building {:?} -> {:?}", job.source, job.output);
        let report = build::run(job).with_context(|| format!("Failed to build {:?}", job.source))?;
        reports.push(report);
    }

    tracing::info!("Built {} clips", reports.len());
    Ok(reports)
}

/// Directory that manifest-relative paths resolve against
pub fn manifest_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_minimal() {
        let manifest = TbaManifest::parse(
            r#"
[retarget]
target = "models/jean.glb"

[[clips]]
source = "mixamo/walk.glb"
"#,
        )
        .unwrap();

        assert_eq!(manifest.retarget.hip, "mixamorigHips");
        assert_eq!(manifest.retarget.scale, 0.01);
        assert_eq!(manifest.retarget.hip_influence, "xyz");
        assert_eq!(manifest.retarget.bone_prefix, "mixamorig");
        assert!(manifest.output.dir.is_none());
        assert_eq!(manifest.clips.len(), 1);
        manifest.validate().unwrap();
    }

    #[test]
    fn test_clip_overrides() {
        let manifest = TbaManifest::parse(
            r#"
[retarget]
target = "models/jean.glb"
hip_influence = "xz"

[[clips]]
source = "mixamo/walk.glb"
name = "jean_walk"
scale = 1.0
hip = "Root"
bone_prefix = ""
"#,
        )
        .unwrap();

        let options = manifest.options_for(&manifest.clips[0]).unwrap();
        assert_eq!(options.hip_bone_name, "Root");
        assert_eq!(options.scale, 1.0);
        assert_eq!(options.hip_influence, [true, false, true]);
        assert!(matches!(options.bone_name_map, BoneNameMap::Identity));
        assert_eq!(options.name_override.as_deref(), Some("jean_walk"));
    }

    #[test]
    fn test_jobs_resolve_paths() {
        let manifest = TbaManifest::parse(
            r#"
[output]
dir = "out"

[retarget]
target = "models/jean.glb"

[[clips]]
source = "mixamo/walk.glb"
animation = "1"

[[clips]]
source = "mixamo/idle.glb"
name = "rest"
target = "models/other.json"
"#,
        )
        .unwrap();

        let base = Path::new("assets");
        let jobs = manifest.jobs(base, None).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].source, base.join("mixamo/walk.glb"));
        assert_eq!(jobs[0].target, base.join("models/jean.glb"));
        assert_eq!(jobs[0].output, base.join("out").join("walk.tba"));
        assert_eq!(jobs[0].animation, Some(AnimationSelector::Index(1)));
        assert_eq!(jobs[1].target, base.join("models/other.json"));
        assert_eq!(jobs[1].output, base.join("out").join("rest.tba"));

        let jobs = manifest.jobs(base, Some(Path::new("elsewhere"))).unwrap();
        assert_eq!(jobs[1].output, Path::new("elsewhere").join("rest.tba"));
    }

    #[test]
    fn test_no_clips_invalid() {
        let manifest = TbaManifest::parse("[retarget]\ntarget = \"jean.glb\"\n").unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_missing_target_invalid() {
        let manifest = TbaManifest::parse("[[clips]]\nsource = \"walk.glb\"\n").unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("no target"));
    }

    #[test]
    fn test_bad_hip_influence_invalid() {
        let manifest = TbaManifest::parse(
            r#"
[retarget]
target = "jean.glb"
hip_influence = "xw"

[[clips]]
source = "walk.glb"
"#,
        )
        .unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_bad_scale_invalid() {
        let manifest = TbaManifest::parse(
            r#"
[retarget]
target = "jean.glb"

[[clips]]
source = "walk.glb"
scale = 0.0
"#,
        )
        .unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_duplicate_outputs_invalid() {
        let manifest = TbaManifest::parse(
            r#"
[output]
dir = "out"

[retarget]
target = "jean.glb"

[[clips]]
source = "a/walk.glb"

[[clips]]
source = "b/walk.glb"
"#,
        )
        .unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("walk.tba"));
    }

    #[test]
    fn test_same_stem_in_separate_dirs_valid() {
        let manifest = TbaManifest::parse(
            r#"
[retarget]
target = "jean.glb"

[[clips]]
source = "a/walk.glb"

[[clips]]
source = "b/walk.glb"
"#,
        )
        .unwrap();
        manifest.validate().unwrap();

        let base = Path::new("assets");
        let jobs = manifest.jobs(base, None).unwrap();
        assert_eq!(jobs[0].output, base.join("a/walk.tba"));
        assert_eq!(jobs[1].output, base.join("b/walk.tba"));

        // A shared override directory makes them collide
        assert!(manifest.jobs(base, Some(Path::new("out"))).is_err());
    }

    #[test]
    fn test_manifest_dir() {
        assert_eq!(manifest_dir(Path::new("tba.toml")), PathBuf::from("."));
        assert_eq!(
            manifest_dir(Path::new("assets/tba.toml")),
            PathBuf::from("assets")
        );
    }
}
