//! Shared types and codec for the TBA binary animation format
//!
//! This crate provides everything needed to produce and consume `.tba` files
//! without touching the filesystem:
//! - `tba-export` (asset pipeline) builds containers from imported clips
//! - runtimes load containers and hand the decoded clip to their rig
//!
//! # Modules
//!
//! - [`formats`] - Clip model, skeleton, codec, compressor and container
//! - [`retarget`] - Retargeting interface and the default skeleton retargeter
//! - [`pipeline`] - `build_tba` / `load_tba` producer interface
//! - [`error`] - Error kinds shared by every operation

pub mod error;
pub mod formats;
pub mod pipeline;
pub mod retarget;

pub use error::{ErrorKind, TbaError};

// Re-export commonly used format items
pub use formats::{
    AnimationClip,
    Bone,
    Container,
    EncodeStats,
    // Constants
    FORMAT_VERSION,
    Interpolation,
    MAX_DECOMPRESSED_SIZE,
    Skeleton,
    TBA_EXT,
    Track,
    TrackProperty,
    Transform,
    // Codec / container operations
    compress,
    compression_ratio,
    decode_container,
    decompress,
    deserialize,
    encode_container,
    encode_container_with_stats,
    serialize,
};

pub use pipeline::{
    BuildReport, Stage, build_tba, build_tba_report, build_tba_with, load_tba, load_tba_container,
};
pub use retarget::{BoneNameMap, RetargetOptions, Retargeter, SkeletonRetargeter};
