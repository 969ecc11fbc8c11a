//! Audio module: in-memory buffers, MP3 export and audiobook assembly.

pub mod assembler;
mod buffer;
pub mod encoder;

pub use assembler::AudiobookAssembler;
pub use buffer::AudioBuffer;
pub use encoder::Mp3Encoder;
