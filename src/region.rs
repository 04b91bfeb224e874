use std::{io, ptr, slice};

use crate::error::{HeapError, Result};

/// Anonymous private mapping used as the backing store of an arena.
///
/// The kernel hands the pages back zeroed. The mapping is released on drop.
pub struct MmapRegion {
  base: *mut u8,
  len: usize,
}

impl MmapRegion {
  pub fn new(len: usize) -> Result<Self> {
    if len == 0 {
      return Err(HeapError::MapFailed { len, errno: 0 });
    }

    let base = unsafe {
      libc::mmap(
        ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if base == libc::MAP_FAILED {
      let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
      log::warn!("[region] mmap({}) failed, errno = {}", len, errno);
      return Err(HeapError::MapFailed { len, errno });
    }

    log::debug!("[region] mapped {} bytes at {:p}", len, base);

    Ok(Self {
      base: base as *mut u8,
      len,
    })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }
}

impl AsRef<[u8]> for MmapRegion {
  fn as_ref(&self) -> &[u8] {
    // The mapping stays valid and exclusively owned until drop.
    unsafe { slice::from_raw_parts(self.base, self.len) }
  }
}

impl AsMut<[u8]> for MmapRegion {
  fn as_mut(&mut self) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(self.base, self.len) }
  }
}

impl Drop for MmapRegion {
  fn drop(&mut self) {
    let rc = unsafe { libc::munmap(self.base.cast(), self.len) };
    if rc != 0 {
      log::warn!(
        "[region] munmap({:p}, {}) failed: {}",
        self.base,
        self.len,
        io::Error::last_os_error()
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mapping_is_zeroed_and_writable() {
    let mut region = MmapRegion::new(4096).unwrap();

    assert_eq!(region.len(), 4096);
    assert!(region.as_ref().iter().all(|&b| b == 0));

    region.as_mut()[4095] = 0xAB;

    assert_eq!(region.as_ref()[4095], 0xAB);
  }

  #[test]
  fn test_empty_mapping_is_rejected() {
    assert!(matches!(
      MmapRegion::new(0),
      Err(HeapError::MapFailed { len: 0, .. })
    ));
  }
}
