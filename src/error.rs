use thiserror::Error;

/// Errors reported by the arena and the allocator built on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
  #[error("arena used before it was initialized")]
  ArenaUninitialized,

  #[error("arena is already initialized")]
  ArenaAlreadyInitialized,

  #[error("out of memory ({requested} bytes requested, {available} available)")]
  OutOfMemory { requested: usize, available: usize },

  #[error("cannot move the break down by {requested} bytes, only {available} in use")]
  InvalidShrink { requested: usize, available: usize },

  #[error("allocation size must be greater than zero")]
  ZeroSize,

  #[error("no block header can live at payload offset {offset}")]
  OutOfBounds { offset: usize },

  #[error("header size {size} is too small (minimum {min} bytes)")]
  InvalidHeaderSize { size: usize, min: usize },

  #[error("mmap of {len} bytes failed (errno {errno})")]
  MapFailed { len: usize, errno: i32 },
}

pub type Result<T> = core::result::Result<T, HeapError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages_carry_sizes() {
    let err = HeapError::OutOfMemory {
      requested: 19,
      available: 4,
    };

    assert_eq!(
      err.to_string(),
      "out of memory (19 bytes requested, 4 available)"
    );
  }
}
