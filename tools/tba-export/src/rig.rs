//! Rig loading: a skeleton plus an optional clip, from glTF/GLB or JSON
//!
//! JSON rigs use the same field names as the `.tba` structured form:
//!
//! ```text
//! {
//!   "skeleton": [ { "name": "Hips", "parent": null, "bind": { ... } }, ... ],
//!   "clip": { "name": "walk", "duration": 1.0, "tracks": [ ... ] }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tba_common::{AnimationClip, Skeleton};

use crate::animation::{self, AnimationSelector};
use crate::skeleton;

/// Rig loading errors not covered by the underlying parsers
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("Unsupported rig format: {0:?} (use .glb, .gltf, or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("{0:?} contains no animation clip")]
    MissingClip(PathBuf),
}

/// Skeleton with the clip that drives it, if the file carries one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rig {
    pub skeleton: Skeleton,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<AnimationClip>,
}

impl Rig {
    /// Parse a JSON rig and check its skeleton and clip
    pub fn from_json(content: &str) -> Result<Self> {
        let rig: Rig = serde_json::from_str(content).context("Failed to parse rig JSON")?;
        rig.skeleton.validate()?;
        if let Some(clip) = &rig.clip {
            clip.validate()?;
        }
        Ok(rig)
    }

    /// The clip, or an error naming `path` when there is none
    pub fn into_clip(self, path: &Path) -> Result<(Skeleton, AnimationClip)> {
        match self.clip {
            Some(clip) => Ok((self.skeleton, clip)),
            None => Err(RigError::MissingClip(path.to_path_buf()).into()),
        }
    }
}

/// Lowercased extension of `path`
fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Load the skeleton (and clip, when `with_clip` is set) of a rig file
///
/// glTF/GLB files use their first skin; `selector` picks the animation.
/// JSON rigs ignore `selector`.
pub fn load_rig(
    path: &Path,
    with_clip: bool,
    selector: Option<&AnimationSelector>,
) -> Result<Rig> {
    match extension(path).as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rig: {}", path.display()))?;
            Rig::from_json(&content).with_context(|| format!("Invalid rig: {}", path.display()))
        }
        "gltf" | "glb" => {
            let skeleton = skeleton::import_skeleton(path)?;
            let clip = if with_clip {
                Some(animation::import_clip(path, selector)?)
            } else {
                None
            };
            Ok(Rig { skeleton, clip })
        }
        _ => Err(RigError::UnsupportedFormat(path.to_path_buf()).into()),
    }
}
