//! Producer interface: build and load `.tba` buffers
//!
//! Each call runs the whole pipeline on in-memory buffers and keeps no state
//! between calls:
//!
//! ```text
//! encode: Idle → Validating → Transforming → Serializing → Compressing → Done
//! decode: Idle → Decompressing → Deserializing → Validating → Done
//! ```
//!
//! Any stage can end the call with a [`TbaError`]; the stage is recorded in
//! the log event so a failure can be located without a partial result.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::TbaError;
use crate::formats::container::{decode_container_staged, encode_container_staged};
use crate::formats::{AnimationClip, Container, EncodeStats, Skeleton};
use crate::retarget::{RetargetOptions, Retargeter, SkeletonRetargeter};

/// Pipeline stage of one encode/decode invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Transforming,
    Serializing,
    Compressing,
    Decompressing,
    Deserializing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Transforming => "transforming",
            Stage::Serializing => "serializing",
            Stage::Compressing => "compressing",
            Stage::Decompressing => "decompressing",
            Stage::Deserializing => "deserializing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Output of [`build_tba_report`]
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Encoded `.tba` bytes
    pub bytes: Vec<u8>,
    /// The retargeted clip that was encoded
    pub clip: AnimationClip,
    pub stats: EncodeStats,
    /// Time taken to decode `bytes` again as a load check
    pub verify_time: Duration,
}

/// Retarget `source_clip` onto `target_skeleton` and encode it.
///
/// Uses the default [`SkeletonRetargeter`].
pub fn build_tba(
    source_clip: &AnimationClip,
    source_skeleton: &Skeleton,
    target_skeleton: &Skeleton,
    options: &RetargetOptions,
    version: &str,
) -> Result<Vec<u8>, TbaError> {
    build_tba_with(
        &SkeletonRetargeter,
        source_clip,
        source_skeleton,
        target_skeleton,
        options,
        version,
    )
}

/// [`build_tba`] with an injected retargeting strategy
pub fn build_tba_with<R: Retargeter + ?Sized>(
    retargeter: &R,
    source_clip: &AnimationClip,
    source_skeleton: &Skeleton,
    target_skeleton: &Skeleton,
    options: &RetargetOptions,
    version: &str,
) -> Result<Vec<u8>, TbaError> {
    let (bytes, _, _) = encode(
        retargeter,
        source_clip,
        source_skeleton,
        target_skeleton,
        options,
        version,
    )?;
    Ok(bytes)
}

/// [`build_tba`] plus size diagnostics and a verification decode
pub fn build_tba_report(
    source_clip: &AnimationClip,
    source_skeleton: &Skeleton,
    target_skeleton: &Skeleton,
    options: &RetargetOptions,
    version: &str,
) -> Result<BuildReport, TbaError> {
    let (bytes, clip, stats) = encode(
        &SkeletonRetargeter,
        source_clip,
        source_skeleton,
        target_skeleton,
        options,
        version,
    )?;

    let start = Instant::now();
    let decoded = load_tba(&bytes)?;
    let verify_time = start.elapsed();

    if decoded != clip {
        return Err(TbaError::validation(format!(
            "clip '{}' did not survive a decode of its own output",
            clip.name
        )));
    }

    Ok(BuildReport {
        bytes,
        clip,
        stats,
        verify_time,
    })
}

fn encode<R: Retargeter + ?Sized>(
    retargeter: &R,
    source_clip: &AnimationClip,
    source_skeleton: &Skeleton,
    target_skeleton: &Skeleton,
    options: &RetargetOptions,
    version: &str,
) -> Result<(Vec<u8>, AnimationClip, EncodeStats), TbaError> {
    let mut stage = Stage::Idle;
    let result = run_encode(
        retargeter,
        source_clip,
        source_skeleton,
        target_skeleton,
        options,
        version,
        &mut stage,
    );

    match &result {
        Ok((bytes, clip, _)) => tracing::debug!(
            %stage,
            clip = %clip.name,
            bytes = bytes.len(),
            "built tba"
        ),
        Err(e) => tracing::debug!(%stage, kind = %e.kind(), error = %e, "tba build failed"),
    }

    result
}

fn run_encode<R: Retargeter + ?Sized>(
    retargeter: &R,
    source_clip: &AnimationClip,
    source_skeleton: &Skeleton,
    target_skeleton: &Skeleton,
    options: &RetargetOptions,
    version: &str,
    stage: &mut Stage,
) -> Result<(Vec<u8>, AnimationClip, EncodeStats), TbaError> {
    *stage = Stage::Validating;
    source_skeleton.validate()?;
    target_skeleton.validate()?;
    source_clip.validate()?;
    options.validate()?;

    *stage = Stage::Transforming;
    let clip = retargeter.retarget(target_skeleton, source_skeleton, source_clip, options)?;

    let (bytes, stats) = encode_container_staged(&clip, version, stage)?;

    *stage = Stage::Done;
    Ok((bytes, clip, stats))
}

/// Decode a `.tba` buffer and hand its clip to the caller.
///
/// The container version is not checked; use [`load_tba_container`] to see it.
pub fn load_tba(bytes: &[u8]) -> Result<AnimationClip, TbaError> {
    load_tba_container(bytes).map(Container::into_clip)
}

/// Decode a `.tba` buffer, keeping the version envelope
pub fn load_tba_container(bytes: &[u8]) -> Result<Container, TbaError> {
    let mut stage = Stage::Idle;
    let result = decode_container_staged(bytes, &mut stage);
    if let Err(e) = &result {
        tracing::debug!(%stage, kind = %e.kind(), error = %e, "tba load failed");
    }
    result
}
