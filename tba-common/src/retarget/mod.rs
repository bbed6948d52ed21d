//! Retargeting: remap a clip authored for one skeleton onto another
//!
//! The codec depends on retargeting only through the [`Retargeter`] trait, so
//! alternate strategies (other naming conventions, full-body IK) can be
//! plugged into [`crate::build_tba_with`] without touching the codec.
//! [`SkeletonRetargeter`] is the default, rotation-only strategy:
//!
//! - every target bone is mapped to a source bone name via [`BoneNameMap`]
//! - rotation tracks are copied as the target bone's local rotation
//! - only the hip bone gets a translation track, per axis either
//!   `source * scale` or the target's bind-pose value
//! - scale tracks and non-hip translation tracks are dropped

mod options;


pub use options::{BoneNameMap, DEFAULT_BONE_PREFIX, DEFAULT_HIP_BONE, DEFAULT_SCALE, RetargetOptions};

use hashbrown::HashMap;

use crate::error::TbaError;
use crate::formats::{AnimationClip, Skeleton, Track, TrackProperty};

/// Clip name used when neither an override nor the source provides one
pub const FALLBACK_CLIP_NAME: &str = "retargetedClip";

/// Retargeting strategy
pub trait Retargeter {
    /// Produce a clip driving `target` from `clip`, which drives `source`
    fn retarget(
        &self,
        target: &Skeleton,
        source: &Skeleton,
        clip: &AnimationClip,
        options: &RetargetOptions,
    ) -> Result<AnimationClip, TbaError>;
}

impl<F> Retargeter for F
where
    F: Fn(&Skeleton, &Skeleton, &AnimationClip, &RetargetOptions) -> Result<AnimationClip, TbaError>,
{
    fn retarget(
        &self,
        target: &Skeleton,
        source: &Skeleton,
        clip: &AnimationClip,
        options: &RetargetOptions,
    ) -> Result<AnimationClip, TbaError> {
        self(target, source, clip, options)
    }
}

/// Default rotation-only retargeter
#[derive(Debug, Clone, Copy, Default)]
pub struct SkeletonRetargeter;

/// Source tracks for one bone, first track of each kind wins
#[derive(Default)]
struct SourceTracks<'a> {
    position: Option<&'a Track>,
    rotation: Option<&'a Track>,
}

impl Retargeter for SkeletonRetargeter {
    fn retarget(
        &self,
        target: &Skeleton,
        source: &Skeleton,
        clip: &AnimationClip,
        options: &RetargetOptions,
    ) -> Result<AnimationClip, TbaError> {
        options.validate()?;

        if source.find(&options.hip_bone_name).is_none() {
            return Err(TbaError::retarget(format!(
                "source skeleton has no hip bone '{}'",
                options.hip_bone_name
            )));
        }

        let mut by_bone: HashMap<&str, SourceTracks> = HashMap::new();
        for track in &clip.tracks {
            let entry = by_bone.entry(track.bone.as_str()).or_default();
            match track.property {
                TrackProperty::Position => {
                    entry.position.get_or_insert(track);
                }
                TrackProperty::Rotation => {
                    entry.rotation.get_or_insert(track);
                }
                TrackProperty::Scale => {}
            }
        }

        let mut tracks = Vec::new();
        let mut hip_found = false;
        let mut undriven = 0usize;

        for bone in target.bones() {
            let source_name = options.bone_name_map.map(&bone.name);
            let is_hip = source_name == options.hip_bone_name;
            hip_found |= is_hip;

            let Some(source_tracks) = by_bone.get(source_name.as_str()) else {
                undriven += 1;
                continue;
            };

            if is_hip {
                if let Some(position) = source_tracks.position {
                    tracks.push(hip_translation(
                        &bone.name,
                        position,
                        bone.bind.translation,
                        options,
                    ));
                }
            }

            if let Some(rotation) = source_tracks.rotation {
                tracks.push(Track {
                    bone: bone.name.clone(),
                    ..rotation.clone()
                });
            }
        }

        if !hip_found {
            return Err(TbaError::retarget(format!(
                "no target bone maps onto hip bone '{}'; its bind pose is required",
                options.hip_bone_name
            )));
        }

        let name = match options.name_override.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if !clip.name.is_empty() => clip.name.clone(),
            _ => FALLBACK_CLIP_NAME.to_string(),
        };

        tracing::debug!(
            clip = %name,
            tracks = tracks.len(),
            undriven,
            "retargeted clip"
        );

        Ok(AnimationClip::new(name, clip.duration, tracks))
    }
}

/// Hip translation with per-axis influence:
/// `out[axis] = influence[axis] ? source[axis] * scale : bind[axis]`
fn hip_translation(
    bone: &str,
    source: &Track,
    bind_translation: [f64; 3],
    options: &RetargetOptions,
) -> Track {
    let values = source
        .values
        .chunks_exact(3)
        .flat_map(|keyframe| {
            std::array::from_fn::<f64, 3, _>(|axis| {
                if options.hip_influence[axis] {
                    keyframe[axis] * options.scale
                } else {
                    bind_translation[axis]
                }
            })
        })
        .collect();

    Track::new(
        bone,
        TrackProperty::Position,
        source.times.clone(),
        values,
        source.interpolation,
    )
}
