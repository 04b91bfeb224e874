use crate::error::{HeapError, Result};

/// Fixed-capacity byte region with a movable break, modelled on `sbrk(2)`.
///
/// All positions are offsets into the backing store: `start` is always 0,
/// `end` is the store length, and `current_break` moves between them. The
/// break is only ever changed through [`Arena::adjust_break`].
///
/// ```text
///   end ──────────► ┌───────────────────┐
///                   │      unused       │
///   current_break ► ├───────────────────┤
///                   │      in use       │
///   start ────────► └───────────────────┘
/// ```
pub struct Arena<R> {
  region: Option<R>,
  end: usize,
  current_break: usize,
}

impl<R> Arena<R>
where
  R: AsRef<[u8]> + AsMut<[u8]>,
{
  /// An arena with no backing store. Every operation fails with
  /// [`HeapError::ArenaUninitialized`] until [`Arena::init`] is called.
  pub fn new() -> Self {
    Self {
      region: None,
      end: 0,
      current_break: 0,
    }
  }

  pub fn with_region(region: R) -> Self {
    let end = region.as_ref().len();
    Self {
      region: Some(region),
      end,
      current_break: 0,
    }
  }

  pub fn init(
    &mut self,
    region: R,
  ) -> Result<()> {
    if self.region.is_some() {
      return Err(HeapError::ArenaAlreadyInitialized);
    }
    *self = Self::with_region(region);
    Ok(())
  }

  /// Hands the backing store back, leaving the arena uninitialized.
  pub fn release(&mut self) -> Option<R> {
    self.end = 0;
    self.current_break = 0;
    self.region.take()
  }

  pub fn is_initialized(&self) -> bool {
    self.region.is_some()
  }

  pub fn start(&self) -> usize {
    0
  }

  pub fn end(&self) -> usize {
    self.end
  }

  /// Moves the break by `delta` bytes and returns the break as it was
  /// before the move. `adjust_break(0)` just reports the current break.
  pub fn adjust_break(
    &mut self,
    delta: isize,
  ) -> Result<usize> {
    if self.region.is_none() {
      return Err(HeapError::ArenaUninitialized);
    }

    let previous = self.current_break;
    let magnitude = delta.unsigned_abs();

    if delta > 0 {
      let available = self.end - self.current_break;
      if magnitude > available {
        return Err(HeapError::OutOfMemory {
          requested: magnitude,
          available,
        });
      }
      self.current_break += magnitude;
    } else if delta < 0 {
      let available = self.current_break - self.start();
      if magnitude > available {
        return Err(HeapError::InvalidShrink {
          requested: magnitude,
          available,
        });
      }
      self.current_break -= magnitude;
    }

    if delta != 0 {
      log::trace!(
        "[arena] break {} -> {} (delta {})",
        previous,
        self.current_break,
        delta
      );
    }

    Ok(previous)
  }

  /// Grows the break by `len` bytes, returning the base of the new space.
  pub fn grow(
    &mut self,
    len: usize,
  ) -> Result<usize> {
    let delta = isize::try_from(len).map_err(|_| HeapError::OutOfMemory {
      requested: len,
      available: self.end - self.current_break,
    })?;
    self.adjust_break(delta)
  }

  pub fn current_break(&self) -> Result<usize> {
    self.region.as_ref().ok_or(HeapError::ArenaUninitialized)?;
    Ok(self.current_break)
  }

  /// Bytes between `start` and the break.
  pub fn in_use(&self) -> Result<&[u8]> {
    let region = self.region.as_ref().ok_or(HeapError::ArenaUninitialized)?;
    Ok(&region.as_ref()[..self.current_break])
  }

  pub fn in_use_mut(&mut self) -> Result<&mut [u8]> {
    let current_break = self.current_break;
    let region = self.region.as_mut().ok_or(HeapError::ArenaUninitialized)?;
    Ok(&mut region.as_mut()[..current_break])
  }
}

impl<R> Default for Arena<R>
where
  R: AsRef<[u8]> + AsMut<[u8]>,
{
  fn default() -> Self {
    Self::new()
  }
}
