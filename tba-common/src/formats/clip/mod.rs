//! Animation clip model
//!
//! A clip is a named set of per-bone keyframe tracks plus a duration.
//!
//! # Track layout
//! ```text
//! times:  [t0, t1, t2, ...]                    strictly increasing, finite
//! values: [k0c0, k0c1, k0c2, k1c0, ...]        keyframe-major, finite
//!
//! values.len() == times.len() × component_count
//!   position / scale: 3 components (x, y, z)
//!   rotation:         4 components (x, y, z, w quaternion)
//! ```
//!
//! Keyframe data is kept as `f64` end to end; nothing in the pipeline narrows
//! it to single precision.

mod types;


pub use types::{AnimationClip, Interpolation, Track, TrackProperty};
