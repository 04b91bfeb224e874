use std::fmt;

use crate::heap::BlockInfo;

/// Human-readable block listing, one line per block:
///
/// ```text
/// Block 01: [OCCP] size =   10 bytes
/// Block 02: [FREE] size =    1 byte
/// ```
pub struct Listing<'a>(pub &'a [BlockInfo]);

impl fmt::Display for Listing<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for info in self.0 {
      writeln!(
        f,
        "Block {:02}: [{}] size = {:4} {}",
        info.index,
        info.status,
        info.size,
        if info.size == 1 { "byte" } else { "bytes" }
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::Status;

  #[test]
  fn test_listing_format() {
    let blocks = [
      BlockInfo {
        index: 1,
        status: Status::Occupied,
        size: 10,
      },
      BlockInfo {
        index: 2,
        status: Status::Free,
        size: 1,
      },
      BlockInfo {
        index: 12,
        status: Status::Free,
        size: 12345,
      },
    ];

    assert_eq!(
      Listing(&blocks).to_string(),
      "Block 01: [OCCP] size =   10 bytes\n\
       Block 02: [FREE] size =    1 byte\n\
       Block 12: [FREE] size = 12345 bytes\n"
    );
  }

  #[test]
  fn test_empty_listing() {
    assert_eq!(Listing(&[]).to_string(), "");
  }
}
