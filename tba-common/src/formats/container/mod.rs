//! Versioned container envelope
//!
//! The container is what actually gets compressed into a `.tba` file:
//! `{ version, clip }`. It only exists for the duration of one encode or
//! decode call.
//!
//! Decoding never rejects a version string. Callers that care about
//! compatibility check [`Container::version`] themselves, which lets newer
//! writers add keys without breaking older readers.


use serde::{Deserialize, Serialize};

use super::clip::AnimationClip;
use super::codec::{check_schema, from_structured, to_structured};
use super::compression::{compress, compression_ratio, decompress};
use crate::error::TbaError;
use crate::pipeline::Stage;

/// Current container format version
pub const FORMAT_VERSION: &str = "0.1.0";

/// Decoded `.tba` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Semantic version of the writer's format
    pub version: String,
    pub clip: AnimationClip,
}

/// Borrowed envelope so encoding never clones keyframe data
#[derive(Serialize)]
struct ContainerRef<'a> {
    version: &'a str,
    clip: &'a AnimationClip,
}

/// Size diagnostics from one encode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeStats {
    /// Uncompressed structured form size in bytes
    pub structured_size: usize,
    /// Final `.tba` size in bytes
    pub compressed_size: usize,
    /// `compressed_size / structured_size × 100`
    pub ratio: f64,
}

impl Container {
    /// Wrap a clip with the current format version
    pub fn new(clip: AnimationClip) -> Self {
        Self::with_version(clip, FORMAT_VERSION)
    }

    pub fn with_version(clip: AnimationClip, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            clip,
        }
    }

    /// Encode this container into `.tba` bytes
    pub fn encode(&self) -> Result<Vec<u8>, TbaError> {
        encode_container(&self.clip, &self.version)
    }

    /// Hand the clip over to the caller
    pub fn into_clip(self) -> AnimationClip {
        self.clip
    }

    /// Whether this container's version is compatible with `current`.
    ///
    /// Versions ≥ 1.0 are compatible within a major version; `0.x` versions
    /// only within the same minor. Unparseable versions are incompatible.
    pub fn is_compatible_with(&self, current: &str) -> bool {
        match (compatibility_key(&self.version), compatibility_key(current)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// `(major, minor-if-pre-1.0)` of a `major.minor.patch` string
fn compatibility_key(version: &str) -> Option<(u64, Option<u64>)> {
    let core = version.split(['-', '+']).next()?;
    let mut parts = core.split('.');
    let major: u64 = parts.next()?.trim().parse().ok()?;
    let minor: u64 = match parts.next() {
        Some(minor) => minor.trim().parse().ok()?,
        None => 0,
    };
    Some((major, (major == 0).then_some(minor)))
}

/// Wrap, serialize and compress a clip
pub fn encode_container(clip: &AnimationClip, version: &str) -> Result<Vec<u8>, TbaError> {
    encode_container_with_stats(clip, version).map(|(bytes, _)| bytes)
}

/// [`encode_container`] that also reports size diagnostics
pub fn encode_container_with_stats(
    clip: &AnimationClip,
    version: &str,
) -> Result<(Vec<u8>, EncodeStats), TbaError> {
    encode_container_staged(clip, version, &mut Stage::Idle)
}

/// Encode, leaving `stage` at the step that was running when it returned
pub(crate) fn encode_container_staged(
    clip: &AnimationClip,
    version: &str,
    stage: &mut Stage,
) -> Result<(Vec<u8>, EncodeStats), TbaError> {
    *stage = Stage::Serializing;
    clip.validate()?;
    let structured = to_structured(&ContainerRef { version, clip })?;

    *stage = Stage::Compressing;
    let bytes = compress(&structured)?;

    let stats = EncodeStats {
        structured_size: structured.len(),
        compressed_size: bytes.len(),
        ratio: compression_ratio(bytes.len(), structured.len()),
    };

    tracing::debug!(
        clip = %clip.name,
        version,
        structured = stats.structured_size,
        compressed = stats.compressed_size,
        ratio = stats.ratio,
        "encoded container"
    );

    Ok((bytes, stats))
}

/// Decompress, deserialize and validate a container.
///
/// The version is returned as-is; no version is rejected here.
pub fn decode_container(bytes: &[u8]) -> Result<Container, TbaError> {
    decode_container_staged(bytes, &mut Stage::Idle)
}

/// Decode, leaving `stage` at the step that was running when it returned
pub(crate) fn decode_container_staged(
    bytes: &[u8],
    stage: &mut Stage,
) -> Result<Container, TbaError> {
    *stage = Stage::Decompressing;
    let structured = decompress(bytes)?;

    *stage = Stage::Deserializing;
    let container: Container = from_structured(&structured)?;
    check_schema(&container.clip)?;

    *stage = Stage::Validating;
    container.clip.validate()?;

    tracing::debug!(
        clip = %container.clip.name,
        version = %container.version,
        tracks = container.clip.track_count(),
        "decoded container"
    );

    Ok(container)
}
