//! tba-export library
//!
//! Imports skeletons and clips from glTF/GLB or JSON rigs and writes
//! retargeted `.tba` containers. Also used by the `tba-export` binary.

pub mod animation;
pub mod build;
pub mod manifest;
pub mod rig;
pub mod skeleton;

pub use animation::{import_clip, AnimationSelector};
pub use build::{default_output, BuildJob};
pub use manifest::{build_all, load_manifest, TbaManifest};
pub use rig::{load_rig, Rig, RigError};
pub use skeleton::import_skeleton;
