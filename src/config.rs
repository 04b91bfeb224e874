use std::env;

use crate::{
  align,
  block::MIN_HEADER_SIZE,
  error::{HeapError, Result},
};

/// Arena capacity used when nothing else is configured.
pub const DEFAULT_HEAP_SIZE: usize = 8000;

pub const HEAP_SIZE_VAR: &str = "FIRSTFIT_HEAP_SIZE";
pub const HEADER_SIZE_VAR: &str = "FIRSTFIT_HEADER_SIZE";

/// Fixed parameters of one heap instance. Both values are frozen once the
/// heap is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  pub heap_size: usize,
  pub header_size: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      heap_size: DEFAULT_HEAP_SIZE,
      header_size: MIN_HEADER_SIZE,
    }
  }
}

impl HeapConfig {
  pub fn new(
    heap_size: usize,
    header_size: usize,
  ) -> Self {
    Self {
      heap_size,
      header_size,
    }
  }

  /// Packed header padded to the machine word, so every payload of a
  /// word-multiple size starts word aligned.
  pub fn word_aligned() -> Self {
    Self {
      header_size: align!(MIN_HEADER_SIZE),
      ..Self::default()
    }
  }

  pub fn with_heap_size(
    mut self,
    heap_size: usize,
  ) -> Self {
    self.heap_size = heap_size;
    self
  }

  pub fn with_header_size(
    mut self,
    header_size: usize,
  ) -> Self {
    self.header_size = header_size;
    self
  }

  /// Defaults overlaid with `FIRSTFIT_HEAP_SIZE` / `FIRSTFIT_HEADER_SIZE`.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Some(heap_size) = read_var(HEAP_SIZE_VAR) {
      config.heap_size = heap_size;
    }
    if let Some(header_size) = read_var(HEADER_SIZE_VAR) {
      config.header_size = header_size;
    }

    config
  }

  pub fn validate(&self) -> Result<()> {
    if self.header_size < MIN_HEADER_SIZE {
      return Err(HeapError::InvalidHeaderSize {
        size: self.header_size,
        min: MIN_HEADER_SIZE,
      });
    }
    Ok(())
  }
}

fn read_var(name: &str) -> Option<usize> {
  let raw = env::var(name).ok()?;
  match raw.trim().parse() {
    Ok(value) => Some(value),
    Err(err) => {
      log::warn!("[config] ignoring {}={:?}: {}", name, raw, err);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_match_packed_header() {
    let config = HeapConfig::default();

    assert_eq!(config.heap_size, 8000);
    assert_eq!(config.header_size, 9);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_word_aligned_header() {
    let config = HeapConfig::word_aligned();

    assert_eq!(config.header_size % std::mem::size_of::<usize>(), 0);
    assert!(config.header_size >= MIN_HEADER_SIZE);
  }

  #[test]
  fn test_rejects_short_header() {
    let config = HeapConfig::default().with_header_size(8);

    assert_eq!(
      config.validate(),
      Err(HeapError::InvalidHeaderSize { size: 8, min: 9 })
    );
  }

  // Only test that touches the FIRSTFIT_* variables.
  #[test]
  fn test_from_env_overlay() {
    unsafe {
      env::set_var(HEAP_SIZE_VAR, "abc");
      env::set_var(HEADER_SIZE_VAR, " 16 ");
    }

    let config = HeapConfig::from_env();

    unsafe {
      env::remove_var(HEAP_SIZE_VAR);
      env::remove_var(HEADER_SIZE_VAR);
    }

    assert_eq!(config, HeapConfig::new(DEFAULT_HEAP_SIZE, 16));
    assert_eq!(HeapConfig::from_env(), HeapConfig::default());
  }

  #[test]
  fn test_builder_overrides() {
    let config = HeapConfig::default()
      .with_heap_size(64)
      .with_header_size(16);

    assert_eq!(config, HeapConfig::new(64, 16));
  }
}
