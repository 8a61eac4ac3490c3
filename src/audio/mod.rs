//! Audio input handling.
//!
//! Audio files are treated as undifferentiated byte streams. Interpretation of
//! the bytes belongs to the engine; this module only slices the stream into
//! chunks and, for engines that consume 16-bit samples, reassembles them.

pub mod chunks;
pub mod pcm;
pub mod wav;

pub use chunks::ChunkReader;
pub use pcm::PcmAssembler;
