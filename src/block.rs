use std::fmt;

/// Bytes used by the `size` field at the front of every header.
const SIZE_FIELD: usize = 8;

/// Smallest header able to hold the 8-byte size and the 1-byte status.
/// Larger headers pad after the status byte.
pub const MIN_HEADER_SIZE: usize = SIZE_FIELD + 1;

const STATUS_FREE: u8 = b'f';
const STATUS_OCCUPIED: u8 = b'o';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Free,
  Occupied,
}

impl Status {
  fn from_byte(byte: u8) -> Self {
    if byte == STATUS_FREE {
      Status::Free
    } else {
      Status::Occupied
    }
  }

  fn to_byte(self) -> u8 {
    match self {
      Status::Free => STATUS_FREE,
      Status::Occupied => STATUS_OCCUPIED,
    }
  }

  pub fn is_free(self) -> bool {
    self == Status::Free
  }
}

impl fmt::Display for Status {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Status::Free => f.write_str("FREE"),
      Status::Occupied => f.write_str("OCCP"),
    }
  }
}

/// Handle to an allocation: the payload's offset from the arena start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockPtr(usize);

impl BlockPtr {
  pub fn new(offset: usize) -> Self {
    Self(offset)
  }

  pub fn offset(self) -> usize {
    self.0
  }
}

impl fmt::Display for BlockPtr {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "+{:#x}", self.0)
  }
}

/// Non-owning view of one block: where its header sits and what it says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub header: usize,
  pub size: usize,
  pub status: Status,
}

impl Block {
  pub fn payload(
    &self,
    header_size: usize,
  ) -> usize {
    self.header + header_size
  }

  /// Offset one past the payload, i.e. the next header or the break.
  pub fn end(
    &self,
    header_size: usize,
  ) -> usize {
    self.header + header_size + self.size
  }

  pub fn ptr(
    &self,
    header_size: usize,
  ) -> BlockPtr {
    BlockPtr(self.payload(header_size))
  }

  pub fn is_free(&self) -> bool {
    self.status.is_free()
  }
}

/// Reads the header at `at`, or `None` if it does not fit in `bytes`.
pub fn read_header(
  bytes: &[u8],
  at: usize,
  header_size: usize,
) -> Option<Block> {
  if header_size < MIN_HEADER_SIZE {
    return None;
  }
  let raw = bytes.get(at..at.checked_add(header_size)?)?;
  let size_bytes: [u8; SIZE_FIELD] = raw[..SIZE_FIELD].try_into().ok()?;
  let size = usize::try_from(u64::from_le_bytes(size_bytes)).ok()?;

  Some(Block {
    header: at,
    size,
    status: Status::from_byte(raw[SIZE_FIELD]),
  })
}

/// Writes a full header at `at`. Returns `false`, touching nothing, if the
/// header would not fit.
pub fn write_header(
  bytes: &mut [u8],
  at: usize,
  header_size: usize,
  size: usize,
  status: Status,
) -> bool {
  let Some(raw) = at
    .checked_add(header_size)
    .filter(|_| header_size >= MIN_HEADER_SIZE)
    .and_then(|end| bytes.get_mut(at..end))
  else {
    return false;
  };

  raw[..SIZE_FIELD].copy_from_slice(&(size as u64).to_le_bytes());
  raw[SIZE_FIELD] = status.to_byte();
  raw[MIN_HEADER_SIZE..].fill(0);
  true
}

pub fn write_status(
  bytes: &mut [u8],
  at: usize,
  status: Status,
) -> bool {
  match at.checked_add(SIZE_FIELD).and_then(|i| bytes.get_mut(i)) {
    Some(byte) => {
      *byte = status.to_byte();
      true
    }
    None => false,
  }
}

pub fn write_size(
  bytes: &mut [u8],
  at: usize,
  size: usize,
) -> bool {
  match at
    .checked_add(SIZE_FIELD)
    .and_then(|end| bytes.get_mut(at..end))
  {
    Some(raw) => {
      raw.copy_from_slice(&(size as u64).to_le_bytes());
      true
    }
    None => false,
  }
}

/// Walks the implicit block list in address order.
///
/// `bytes` must end exactly at the break. A header whose block would run
/// past the break ends the walk.
pub struct Blocks<'a> {
  bytes: &'a [u8],
  header_size: usize,
  cursor: usize,
}

impl<'a> Blocks<'a> {
  pub fn new(
    bytes: &'a [u8],
    header_size: usize,
  ) -> Self {
    Self {
      bytes,
      header_size,
      cursor: 0,
    }
  }
}

impl Iterator for Blocks<'_> {
  type Item = Block;

  fn next(&mut self) -> Option<Block> {
    if self.cursor >= self.bytes.len() {
      return None;
    }

    let block = read_header(self.bytes, self.cursor, self.header_size).and_then(|block| {
      let end = block.header.checked_add(self.header_size)?.checked_add(block.size)?;
      Some((block, end))
    });
    match block {
      Some((block, end)) if end <= self.bytes.len() => {
        self.cursor = end;
        Some(block)
      }
      _ => {
        log::warn!("[block] corrupt header at offset {}", self.cursor);
        self.cursor = self.bytes.len();
        None
      }
    }
  }
}
