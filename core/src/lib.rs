pub mod wire;

pub const PORT: u16 = 9090;

/// Payload bytes move in chunks of this size, flushed one chunk at a time.
pub const CHUNK_SIZE: usize = 1024;
