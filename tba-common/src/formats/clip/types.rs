//! Clip, track and enum types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TbaError;

/// Transform property driven by a track
///
/// Encoded as its lowercase tag; unknown tags are rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum TrackProperty {
    Position,
    Rotation,
    Scale,
}

impl TrackProperty {
    /// Number of floats per keyframe (3 for vectors, 4 for quaternions)
    pub const fn component_count(self) -> usize {
        match self {
            TrackProperty::Position | TrackProperty::Scale => 3,
            TrackProperty::Rotation => 4,
        }
    }

    /// Wire tag used in the structured form
    pub const fn as_str(self) -> &'static str {
        match self {
            TrackProperty::Position => "position",
            TrackProperty::Rotation => "rotation",
            TrackProperty::Scale => "scale",
        }
    }
}

impl From<TrackProperty> for &'static str {
    fn from(property: TrackProperty) -> Self {
        property.as_str()
    }
}

impl TryFrom<String> for TrackProperty {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        match tag.as_str() {
            "position" => Ok(TrackProperty::Position),
            "rotation" => Ok(TrackProperty::Rotation),
            "scale" => Ok(TrackProperty::Scale),
            _ => Err(format!(
                "unknown track type `{}`, expected `position`, `rotation` or `scale`",
                tag
            )),
        }
    }
}

impl fmt::Display for TrackProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyframe interpolation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    Cubic,
}

impl Interpolation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Interpolation::Step => "step",
            Interpolation::Linear => "linear",
            Interpolation::Cubic => "cubic",
        }
    }
}

impl From<Interpolation> for &'static str {
    fn from(interpolation: Interpolation) -> Self {
        interpolation.as_str()
    }
}

impl TryFrom<String> for Interpolation {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        match tag.as_str() {
            "step" => Ok(Interpolation::Step),
            "linear" => Ok(Interpolation::Linear),
            "cubic" => Ok(Interpolation::Cubic),
            _ => Err(format!(
                "unknown interpolation `{}`, expected `step`, `linear` or `cubic`",
                tag
            )),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-series of one transform property for one bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Name of the bone this track drives
    #[serde(rename = "name")]
    pub bone: String,
    /// Driven property
    #[serde(rename = "type")]
    pub property: TrackProperty,
    /// Keyframe times in seconds (strictly increasing)
    pub times: Vec<f64>,
    /// Flattened keyframe values (`times.len() × component_count`)
    pub values: Vec<f64>,
    pub interpolation: Interpolation,
}

impl Track {
    pub fn new(
        bone: impl Into<String>,
        property: TrackProperty,
        times: Vec<f64>,
        values: Vec<f64>,
        interpolation: Interpolation,
    ) -> Self {
        Self {
            bone: bone.into(),
            property,
            times,
            values,
            interpolation,
        }
    }

    pub fn keyframe_count(&self) -> usize {
        self.times.len()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn end_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Component slice of keyframe `index`, if in range
    pub fn keyframe(&self, index: usize) -> Option<&[f64]> {
        let n = self.property.component_count();
        let start = index.checked_mul(n)?;
        self.values.get(start..start.checked_add(n)?)
    }

    /// Iterate `(time, components)` pairs
    pub fn keyframes(&self) -> impl Iterator<Item = (f64, &[f64])> {
        self.times
            .iter()
            .copied()
            .zip(self.values.chunks_exact(self.property.component_count()))
    }

    /// Human-readable label used in error messages (`Hips.rotation`)
    pub fn label(&self) -> String {
        format!("{}.{}", self.bone, self.property)
    }

    /// Check that `values` holds exactly one component group per time.
    ///
    /// Shared by validation and the codec's schema check.
    pub fn count_mismatch(&self) -> Option<(usize, usize)> {
        let expected = self.times.len() * self.property.component_count();
        (self.values.len() != expected).then_some((expected, self.values.len()))
    }

    /// Validate track invariants; `index` is only used for the message.
    pub fn validate(&self, index: usize) -> Result<(), TbaError> {
        let fail = |reason: String| -> Result<(), TbaError> {
            Err(TbaError::validation(format!(
                "track {} '{}': {}",
                index,
                self.label(),
                reason
            )))
        };

        if self.bone.is_empty() {
            return fail("empty bone name".to_string());
        }
        if self.times.is_empty() {
            return fail("no keyframes".to_string());
        }
        if let Some((expected, actual)) = self.count_mismatch() {
            return fail(format!(
                "expected {} values for {} keyframes, found {}",
                expected,
                self.times.len(),
                actual
            ));
        }
        if let Some(i) = self.times.iter().position(|t| !t.is_finite()) {
            return fail(format!("non-finite time at keyframe {}", i));
        }
        for (i, pair) in self.times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return fail(format!(
                    "times not strictly increasing at keyframe {} ({} <= {})",
                    i + 1,
                    pair[1],
                    pair[0]
                ));
            }
        }
        if let Some(i) = self.values.iter().position(|v| !v.is_finite()) {
            return fail(format!(
                "non-finite value at keyframe {}",
                i / self.property.component_count()
            ));
        }
        Ok(())
    }
}

/// Named animation: keyframe tracks plus a duration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Clip length in seconds (≥ the last keyframe time of every track)
    pub duration: f64,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f64, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Build a clip whose duration is the latest keyframe time (0 when empty)
    pub fn with_computed_duration(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let mut clip = Self::new(name, 0.0, tracks);
        clip.duration = clip.end_time().unwrap_or(0.0).max(0.0);
        clip
    }

    /// Latest keyframe time across all tracks
    pub fn end_time(&self) -> Option<f64> {
        self.tracks
            .iter()
            .filter_map(Track::end_time)
            .reduce(f64::max)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total keyframes across all tracks
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(Track::keyframe_count).sum()
    }

    /// First track driving `property` on `bone`
    pub fn find_track(&self, bone: &str, property: TrackProperty) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.bone == bone && t.property == property)
    }

    /// Clamp a playback time into `[0, duration]`.
    ///
    /// Consumers clamp rather than wrap; looping is a playback decision made
    /// outside the codec.
    pub fn clamp_time(&self, time: f64) -> f64 {
        if time.is_nan() {
            return 0.0;
        }
        time.clamp(0.0, self.duration.max(0.0))
    }

    /// Validate clip and track invariants
    pub fn validate(&self) -> Result<(), TbaError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TbaError::validation(format!(
                "clip '{}': invalid duration {}",
                self.name, self.duration
            )));
        }

        for (i, track) in self.tracks.iter().enumerate() {
            track.validate(i)?;
        }

        if let Some(end) = self.end_time() {
            if end > self.duration {
                return Err(TbaError::validation(format!(
                    "clip '{}': duration {} is shorter than last keyframe at {}",
                    self.name, self.duration, end
                )));
            }
        }

        Ok(())
    }
}
