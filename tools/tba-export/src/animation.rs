//! Animation importer (glTF animation -> [`AnimationClip`])
//!
//! Channels are imported keyframe for keyframe; nothing is resampled.
//! Only channels targeting joints of the chosen skin become tracks.

use anyhow::{Context, Result};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation as GltfInterpolation;
use hashbrown::HashSet;
use std::fmt;
use std::path::Path;

use tba_common::{AnimationClip, Interpolation, Track, TrackProperty};

use crate::skeleton::node_name;

/// Which animation of a file to import: by index, or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for AnimationSelector {
    /// Digits select by index, anything else by name
    fn from(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(index) => AnimationSelector::Index(index),
            Err(_) => AnimationSelector::Name(s.to_string()),
        }
    }
}

impl fmt::Display for AnimationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationSelector::Index(index) => write!(f, "#{}", index),
            AnimationSelector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Pick an animation from a document (first one when `selector` is `None`)
pub fn select_animation<'a>(
    document: &'a gltf::Document,
    selector: Option<&AnimationSelector>,
) -> Result<gltf::Animation<'a>> {
    match selector {
        None => document
            .animations()
            .next()
            .context("No animations found in glTF file"),
        Some(AnimationSelector::Index(index)) => document
            .animations()
            .nth(*index)
            .with_context(|| format!("Animation index {} not found in glTF", index)),
        Some(AnimationSelector::Name(name)) => document
            .animations()
            .find(|a| a.name() == Some(name.as_str()))
            .with_context(|| {
                let available: Vec<_> = document.animations().filter_map(|a| a.name()).collect();
                format!(
                    "Animation '{}' not found in glTF. Available animations: {:?}",
                    name, available
                )
            }),
    }
}

/// Import one animation as a clip driving the joints of `skin`
pub fn clip_from_animation(
    animation: &gltf::Animation,
    skin: &gltf::Skin,
    buffers: &[gltf::buffer::Data],
) -> Result<AnimationClip> {
    let joints: HashSet<usize> = skin.joints().map(|j| j.index()).collect();
    let mut tracks = Vec::new();

    for channel in animation.channels() {
        let target = channel.target();
        let node = target.node();

        // Skip if not a joint in our skin
        if !joints.contains(&node.index()) {
            continue;
        }

        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let times: Vec<f64> = reader
            .read_inputs()
            .context("Animation channel has no input times")?
            .map(f64::from)
            .collect();

        let (property, values): (TrackProperty, Vec<f64>) = match reader
            .read_outputs()
            .context("Animation channel has no output values")?
        {
            ReadOutputs::Translations(iter) => (
                TrackProperty::Position,
                iter.flat_map(|v| v.map(f64::from)).collect(),
            ),
            ReadOutputs::Rotations(rotations) => (
                TrackProperty::Rotation,
                rotations.into_f32().flat_map(|q| q.map(f64::from)).collect(),
            ),
            ReadOutputs::Scales(iter) => (
                TrackProperty::Scale,
                iter.flat_map(|v| v.map(f64::from)).collect(),
            ),
            ReadOutputs::MorphTargetWeights(_) => continue, // Ignore morph targets
        };

        let (interpolation, values) = match channel.sampler().interpolation() {
            GltfInterpolation::Step => (Interpolation::Step, values),
            GltfInterpolation::Linear => (Interpolation::Linear, values),
            GltfInterpolation::CubicSpline => (
                Interpolation::Cubic,
                spline_values(&values, property.component_count()),
            ),
        };

        tracks.push(Track::new(
            node_name(&node),
            property,
            times,
            values,
            interpolation,
        ));
    }

    let clip = AnimationClip::with_computed_duration(animation.name().unwrap_or_default(), tracks);
    clip.validate().with_context(|| {
        format!(
            "Animation '{}' is not a valid clip",
            animation.name().unwrap_or("unnamed")
        )
    })?;
    Ok(clip)
}

/// Keep the value element of each (in-tangent, value, out-tangent) triple
fn spline_values(values: &[f64], components: usize) -> Vec<f64> {
    values
        .chunks_exact(components * 3)
        .flat_map(|triple| &triple[components..components * 2])
        .copied()
        .collect()
}

/// Import an animation of a glTF/GLB file against its first skin
pub fn import_clip(input: &Path, selector: Option<&AnimationSelector>) -> Result<AnimationClip> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let skin = document
        .skins()
        .next()
        .with_context(|| format!("No skins found in {:?}", input))?;
    let animation = select_animation(&document, selector)?;
    let clip = clip_from_animation(&animation, &skin, &buffers)?;

    tracing::debug!(
        "Imported animation '{}': {} tracks, {} keyframes ({:.2}s)",
        clip.name,
        clip.track_count(),
        clip.keyframe_count(),
        clip.duration
    );
    Ok(clip)
}

/// List available animations in a glTF file
pub fn list_animations(input: &Path) -> Result<()> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let animations: Vec<_> = document.animations().collect();
    if animations.is_empty() {
        tracing::info!("No animations found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Animations in {:?}:", input);
    for (i, anim) in animations.iter().enumerate() {
        let name = anim.name().unwrap_or("unnamed");
        let channel_count = anim.channels().count();

        // Calculate duration
        let max_time = anim
            .channels()
            .filter_map(|channel| {
                let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
                reader.read_inputs().and_then(|times| times.last())
            })
            .fold(0.0f32, f32::max);

        tracing::info!(
            "  [{}] '{}': {} channels, {:.2}s",
            i,
            name,
            channel_count,
            max_time
        );
    }

    Ok(())
}
