//! Retarget configuration
//!
//! Everything that influences an encode is carried explicitly in
//! [`RetargetOptions`]; nothing is read from ambient state.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::error::TbaError;

/// Default hip bone of Mixamo-rigged sources
pub const DEFAULT_HIP_BONE: &str = "mixamorigHips";

/// Default prefix mapping target bone names onto Mixamo source names
pub const DEFAULT_BONE_PREFIX: &str = "mixamorig";

/// Default translation scale (centimetre sources onto metre targets)
pub const DEFAULT_SCALE: f64 = 0.01;

/// Maps a target bone name to the source bone name that drives it
#[derive(Clone, Default)]
pub enum BoneNameMap {
    /// Source and target share names
    #[default]
    Identity,
    /// Source name is `prefix + target name`
    Prefix(String),
    /// Explicit target → source table; unlisted bones keep their name
    Table(HashMap<String, String>),
    /// Arbitrary mapping function
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl BoneNameMap {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        BoneNameMap::Custom(Arc::new(f))
    }

    /// Source bone name for the target bone `target`
    pub fn map(&self, target: &str) -> String {
        match self {
            BoneNameMap::Identity => target.to_string(),
            BoneNameMap::Prefix(prefix) => format!("{}{}", prefix, target),
            BoneNameMap::Table(table) => table
                .get(target)
                .cloned()
                .unwrap_or_else(|| target.to_string()),
            BoneNameMap::Custom(f) => f(target),
        }
    }
}

impl fmt::Debug for BoneNameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoneNameMap::Identity => f.write_str("Identity"),
            BoneNameMap::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            BoneNameMap::Table(table) => f.debug_tuple("Table").field(table).finish(),
            BoneNameMap::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Retargeting parameters
#[derive(Debug, Clone)]
pub struct RetargetOptions {
    /// Source hip/root bone whose translation is transferred
    pub hip_bone_name: String,
    /// Uniform scale applied to transferred hip translation (> 0)
    pub scale: f64,
    /// Per-axis (x, y, z) selector: `true` takes the source motion, `false`
    /// holds the target's bind-pose value
    pub hip_influence: [bool; 3],
    pub bone_name_map: BoneNameMap,
    /// Output clip name; falls back to the source clip's name when unset or empty
    pub name_override: Option<String>,
}

impl Default for RetargetOptions {
    fn default() -> Self {
        Self {
            hip_bone_name: DEFAULT_HIP_BONE.to_string(),
            scale: DEFAULT_SCALE,
            hip_influence: [true; 3],
            bone_name_map: BoneNameMap::Prefix(DEFAULT_BONE_PREFIX.to_string()),
            name_override: None,
        }
    }
}

impl RetargetOptions {
    pub fn validate(&self) -> Result<(), TbaError> {
        if self.hip_bone_name.is_empty() {
            return Err(TbaError::retarget("hip bone name is empty"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(TbaError::retarget(format!(
                "scale must be a positive finite number, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Parse a hip influence axis list such as `"xz"` or `"none"`
    pub fn parse_hip_influence(axes: &str) -> Result<[bool; 3], TbaError> {
        let axes = axes.trim().to_ascii_lowercase();
        let mut influence = [false; 3];
        if axes == "none" || axes.is_empty() {
            return Ok(influence);
        }
        for c in axes.chars() {
            match c {
                'x' => influence[0] = true,
                'y' => influence[1] = true,
                'z' => influence[2] = true,
                ',' | ' ' => {}
                other => {
                    return Err(TbaError::retarget(format!(
                        "invalid hip influence axis '{}' (use x, y, z or none)",
                        other
                    )));
                }
            }
        }
        Ok(influence)
    }
}
