//! Structured form codec (clip ⇄ MessagePack)
//!
//! Maps are written with named keys so field order never matters and decoders
//! can skip keys they do not know. Every float is written as float64, so
//! keyframes round-trip bit for bit.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::clip::AnimationClip;
use crate::error::TbaError;

/// Encode any serde value as a MessagePack map with named keys
pub fn to_structured<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TbaError> {
    rmp_serde::to_vec_named(value)
        .map_err(|e| TbaError::schema(format!("failed to encode structured form: {}", e)))
}

/// Decode a MessagePack value; any structural mismatch is a schema error
pub fn from_structured<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TbaError> {
    rmp_serde::from_slice(bytes).map_err(|e| TbaError::schema(e.to_string()))
}

/// Serialize a clip to its structured form.
///
/// The clip is validated first; invalid clips are never written.
pub fn serialize(clip: &AnimationClip) -> Result<Vec<u8>, TbaError> {
    clip.validate()?;
    let bytes = to_structured(clip)?;
    tracing::debug!(
        clip = %clip.name,
        tracks = clip.track_count(),
        bytes = bytes.len(),
        "serialized clip"
    );
    Ok(bytes)
}

/// Deserialize a clip from its structured form.
///
/// Schema problems (missing keys, unknown `type`/`interpolation` tags, value
/// counts that do not match the property) are reported as [`TbaError::Schema`];
/// a well-formed clip that breaks clip invariants is a [`TbaError::Validation`].
pub fn deserialize(bytes: &[u8]) -> Result<AnimationClip, TbaError> {
    let clip: AnimationClip = from_structured(bytes)?;
    check_schema(&clip)?;
    clip.validate()?;
    Ok(clip)
}

/// Element-count relationship between `times` and `values` for every track
pub(crate) fn check_schema(clip: &AnimationClip) -> Result<(), TbaError> {
    for (i, track) in clip.tracks.iter().enumerate() {
        if let Some((expected, actual)) = track.count_mismatch() {
            return Err(TbaError::schema(format!(
                "track {} '{}': expected {} values for {} times, found {}",
                i,
                track.label(),
                expected,
                track.times.len(),
                actual
            )));
        }
    }
    Ok(())
}
