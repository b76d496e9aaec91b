//! Stream contract and the stream helpers shipped with the mixer.

pub mod decode;
pub mod looping;
pub mod memory;
pub mod queue;
pub mod rate;
pub mod stream;
pub mod timestamp;
pub mod tone;

pub use decode::load_file;
pub use looping::LoopingStream;
pub use memory::MemoryStream;
pub use queue::{queued_stream, QueueWriter, QueuedStream};
pub use stream::{AudioStream, RewindableAudioStream};
pub use timestamp::Timestamp;
pub use tone::ToneStream;
