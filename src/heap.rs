use crate::{
  arena::Arena,
  block::{self, Block, BlockPtr, Blocks, Status},
  config::HeapConfig,
  error::{HeapError, Result},
  region::MmapRegion,
};

/// One line of [`FirstFitHeap::describe_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// 1-based position in address order.
  pub index: usize,
  pub status: Status,
  pub size: usize,
}

/// First-fit allocator over an implicit, header-embedded block list.
///
/// ```text
///   start                                                    current_break
///   │                                                                    │
///   ▼                                                                    ▼
///   ┌────────┬──────────┬────────┬─────────────────┬────────┬────────────┐
///   │ header │ payload  │ header │     payload     │ header │  payload   │
///   │ size=n │  n bytes │ size=m │     m bytes     │ size=k │  k bytes   │
///   └────────┴──────────┴────────┴─────────────────┴────────┴────────────┘
///            ▲
///            └── BlockPtr handed to the caller
/// ```
///
/// Blocks follow each other with no gaps, so the next header is always at
/// `header + header_size + size`. Nothing here is thread safe; callers that
/// share a heap must serialize access themselves.
pub struct FirstFitHeap<R> {
  arena: Arena<R>,
  header_size: usize,
}

impl FirstFitHeap<MmapRegion> {
  /// Maps `config.heap_size` bytes and builds a heap over them.
  pub fn map(config: &HeapConfig) -> Result<Self> {
    config.validate()?;
    let region = MmapRegion::new(config.heap_size)?;
    Self::new(Arena::with_region(region), config.header_size)
  }
}

impl<R> FirstFitHeap<R>
where
  R: AsRef<[u8]> + AsMut<[u8]>,
{
  pub fn new(
    arena: Arena<R>,
    header_size: usize,
  ) -> Result<Self> {
    HeapConfig::new(arena.end(), header_size).validate()?;
    Ok(Self { arena, header_size })
  }

  pub fn with_region(
    region: R,
    header_size: usize,
  ) -> Result<Self> {
    Self::new(Arena::with_region(region), header_size)
  }

  pub fn header_size(&self) -> usize {
    self.header_size
  }

  pub fn capacity(&self) -> usize {
    self.arena.end() - self.arena.start()
  }

  /// Bytes below the break, headers included.
  pub fn used(&self) -> Result<usize> {
    self.arena.current_break()
  }

  pub fn arena(&self) -> &Arena<R> {
    &self.arena
  }

  /// Gives up the heap, returning the backing store.
  pub fn release(mut self) -> Option<R> {
    self.arena.release()
  }

  /// Reserves `size` bytes and returns the payload handle.
  ///
  /// Takes the first free block (lowest address) that is large enough,
  /// splitting off the excess as a new free block when it can hold a header
  /// plus at least one byte. With no such block the arena grows: a trailing
  /// free block is stretched in place, otherwise a fresh block is appended.
  /// A failed growth leaves every header untouched.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<BlockPtr> {
    if size == 0 {
      return Err(HeapError::ZeroSize);
    }

    let header_size = self.header_size;
    let (fit, last) = self.find_fit(size)?;

    if let Some(block) = fit {
      let bytes = self.arena.in_use_mut()?;

      if block.size > size + header_size {
        let remainder = block.size - size - header_size;
        let at = block.payload(header_size) + size;
        let split = block::write_header(bytes, at, header_size, remainder, Status::Free);
        debug_assert!(split, "split header past the break");
        let shrunk = block::write_size(bytes, block.header, size);
        debug_assert!(shrunk);
        log::trace!(
          "[heap] split block at {}: {} + {} free at {}",
          block.header,
          size,
          remainder,
          at
        );
      }
      let marked = block::write_status(bytes, block.header, Status::Occupied);
      debug_assert!(marked);

      let ptr = block.ptr(header_size);
      log::debug!("[heap] allocate({}) -> {} (reused)", size, ptr);
      return Ok(ptr);
    }

    match last {
      Some(last) if last.is_free() && last.size < size => {
        let missing = size - last.size;
        self.grow(size, missing)?;

        let bytes = self.arena.in_use_mut()?;
        let stretched = block::write_size(bytes, last.header, size)
          && block::write_status(bytes, last.header, Status::Occupied);
        debug_assert!(stretched, "trailing block header past the break");

        let ptr = last.ptr(header_size);
        log::debug!(
          "[heap] allocate({}) -> {} (stretched trailing block by {})",
          size,
          ptr,
          missing
        );
        Ok(ptr)
      }
      _ => {
        let total = size.checked_add(header_size).ok_or(HeapError::OutOfMemory {
          requested: size,
          available: self.capacity() - self.used()?,
        })?;
        let base = self.grow(size, total)?;

        let bytes = self.arena.in_use_mut()?;
        let written = block::write_header(bytes, base, header_size, size, Status::Occupied);
        debug_assert!(written, "new header past the break");

        let ptr = BlockPtr::new(base + header_size);
        log::debug!("[heap] allocate({}) -> {} (appended)", size, ptr);
        Ok(ptr)
      }
    }
  }

  /// First free block holding at least `size` bytes, plus the last block
  /// seen when there is none.
  fn find_fit(
    &self,
    size: usize,
  ) -> Result<(Option<Block>, Option<Block>)> {
    let mut last = None;
    for block in self.blocks()? {
      if block.is_free() && block.size >= size {
        return Ok((Some(block), last));
      }
      last = Some(block);
    }
    Ok((None, last))
  }

  fn grow(
    &mut self,
    size: usize,
    len: usize,
  ) -> Result<usize> {
    self.arena.grow(len).inspect_err(|err| {
      log::warn!("[heap] allocate({}) failed: {}", size, err);
    })
  }

  /// Marks the block behind `ptr` free. No merging and no shrinking.
  ///
  /// The handle is trusted: any offset whose header lies below the break is
  /// accepted, so a handle that did not come from [`Self::allocate`] will
  /// corrupt the block list. Headers outside the used range are refused
  /// with [`HeapError::OutOfBounds`].
  pub fn free(
    &mut self,
    ptr: BlockPtr,
  ) -> Result<()> {
    let header_size = self.header_size;
    let bytes = self.arena.in_use_mut()?;

    let header = ptr
      .offset()
      .checked_sub(header_size)
      .filter(|&at| ptr.offset() <= bytes.len() && at < bytes.len());
    let Some(header) = header else {
      log::warn!("[heap] free({}) outside the used range", ptr);
      return Err(HeapError::OutOfBounds {
        offset: ptr.offset(),
      });
    };

    let marked = block::write_status(bytes, header, Status::Free);
    debug_assert!(marked);
    log::debug!("[heap] free({})", ptr);
    Ok(())
  }

  /// Merges every run of adjacent free blocks into a single free block.
  ///
  /// Occupied blocks never move. Running it twice is the same as once.
  pub fn coalesce_adjacent_free(&mut self) -> Result<()> {
    let header_size = self.header_size;
    let bytes = self.arena.in_use_mut()?;
    let len = bytes.len();

    let mut merged = 0;
    let mut cursor = 0;
    while cursor < len {
      let Some(mut block) = block::read_header(bytes, cursor, header_size) else {
        break;
      };

      if block.is_free() {
        while block.end(header_size) < len {
          match block::read_header(bytes, block.end(header_size), header_size) {
            Some(next) if next.is_free() => {
              log::trace!(
                "[heap] merge block at {} into block at {}",
                next.header,
                block.header
              );
              block.size += header_size + next.size;
              merged += 1;
            }
            _ => break,
          }
        }
        let merged_size = block::write_size(bytes, block.header, block.size);
        debug_assert!(merged_size);
      }

      cursor = block.end(header_size);
    }

    log::debug!("[heap] coalesce merged {} blocks", merged);
    Ok(())
  }

  /// Walks the block list from the arena start to the break.
  pub fn blocks(&self) -> Result<Blocks<'_>> {
    Ok(Blocks::new(self.arena.in_use()?, self.header_size))
  }

  /// Index, status and payload size of every block in address order.
  pub fn describe_blocks(&self) -> Result<Vec<BlockInfo>> {
    Ok(
      self
        .blocks()?
        .enumerate()
        .map(|(i, block)| BlockInfo {
          index: i + 1,
          status: block.status,
          size: block.size,
        })
        .collect(),
    )
  }

  /// Payload bytes of the block behind `ptr`.
  pub fn payload(
    &self,
    ptr: BlockPtr,
  ) -> Result<&[u8]> {
    let bytes = self.arena.in_use()?;
    let block = self.block_at(bytes, ptr)?;
    Ok(&bytes[block.payload(self.header_size)..block.end(self.header_size)])
  }

  pub fn payload_mut(
    &mut self,
    ptr: BlockPtr,
  ) -> Result<&mut [u8]> {
    let header_size = self.header_size;
    let block = self.block_at(self.arena.in_use()?, ptr)?;
    let bytes = self.arena.in_use_mut()?;
    Ok(&mut bytes[block.payload(header_size)..block.end(header_size)])
  }

  fn block_at(
    &self,
    bytes: &[u8],
    ptr: BlockPtr,
  ) -> Result<Block> {
    ptr
      .offset()
      .checked_sub(self.header_size)
      .and_then(|at| block::read_header(bytes, at, self.header_size))
      .filter(|block| block.end(self.header_size) <= bytes.len())
      .ok_or(HeapError::OutOfBounds {
        offset: ptr.offset(),
      })
  }
}
