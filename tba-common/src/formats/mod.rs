//! TBA binary animation formats
//!
//! A `.tba` file is a zlib stream whose payload is a MessagePack map:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  zlib header + deflate stream + adler32     │
//! │  └── Container (MessagePack map)            │
//! │      ├── version: "0.1.0"                   │
//! │      └── clip                               │
//! │          ├── name: str                      │
//! │          ├── duration: f64                  │
//! │          └── tracks: [                      │
//! │              { name, type, times,           │
//! │                values, interpolation } ]    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! No magic bytes - the zlib header identifies the stream and the `version`
//! field disambiguates the payload after decompression.

pub mod clip;
pub mod codec;
pub mod compression;
pub mod container;
pub mod skeleton;

pub use clip::*;
pub use codec::{deserialize, from_structured, serialize, to_structured};
pub use compression::{MAX_DECOMPRESSED_SIZE, compress, compression_ratio, decompress};
pub use container::{
    Container, EncodeStats, FORMAT_VERSION, decode_container, encode_container,
    encode_container_with_stats,
};
pub use skeleton::*;

/// File extension for TBA containers
pub const TBA_EXT: &str = "tba";
