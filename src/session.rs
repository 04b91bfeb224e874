use std::io::{self, Write};

use thiserror::Error;

use crate::{
  block::BlockPtr,
  error::HeapError,
  heap::FirstFitHeap,
  report::Listing,
  script::{self, NAME_SLOTS, Name, Operation, Script},
};

#[derive(Debug, Error)]
pub enum SessionError {
  #[error(transparent)]
  Io(#[from] io::Error),

  #[error(transparent)]
  Heap(#[from] HeapError),
}

/// Runs scripts against a heap, tracking which name owns which allocation.
///
/// The heap trusts every handle it is given, so the checks for allocating a
/// name twice or freeing an unbound name live here.
pub struct Session<R> {
  heap: FirstFitHeap<R>,
  names: [Option<BlockPtr>; NAME_SLOTS],
}

impl<R> Session<R>
where
  R: AsRef<[u8]> + AsMut<[u8]>,
{
  pub fn new(heap: FirstFitHeap<R>) -> Self {
    Self {
      heap,
      names: [None; NAME_SLOTS],
    }
  }

  pub fn heap(&self) -> &FirstFitHeap<R> {
    &self.heap
  }

  pub fn into_heap(self) -> FirstFitHeap<R> {
    self.heap
  }

  pub fn lookup(
    &self,
    name: Name,
  ) -> Option<BlockPtr> {
    self.names[name.slot()]
  }

  pub fn run<W: Write>(
    &mut self,
    script: &Script,
    out: &mut W,
  ) -> Result<(), SessionError> {
    for operation in &script.operations {
      self.apply(*operation, out)?;
    }
    Ok(())
  }

  /// Applies one operation and writes its heading plus either an error
  /// line or the resulting block listing.
  pub fn apply<W: Write>(
    &mut self,
    operation: Operation,
    out: &mut W,
  ) -> Result<(), SessionError> {
    match operation {
      Operation::Malloc { name, size } => {
        writeln!(out, "=== {} {} {} ===", script::MALLOC, name, size)?;

        if self.lookup(name).is_some() {
          writeln!(out, "malloc Error: {} is pointing to some memory address", name)?;
          return Ok(());
        }

        let ptr = match self.heap.allocate(size) {
          Ok(ptr) => ptr,
          Err(err @ (HeapError::OutOfMemory { .. } | HeapError::ZeroSize)) => {
            writeln!(out, "malloc Error: {}", err)?;
            return Ok(());
          }
          Err(err) => return Err(err.into()),
        };

        // Touch every requested byte: a bad handle would clobber a header.
        self.heap.payload_mut(ptr)?[..size].fill(b' ');
        self.names[name.slot()] = Some(ptr);
      }
      Operation::Free { name } => {
        writeln!(out, "=== {} {} ===", script::FREE, name)?;

        let Some(ptr) = self.names[name.slot()].take() else {
          writeln!(out, "free Error: {} is pointing to NULL", name)?;
          return Ok(());
        };
        self.heap.free(ptr)?;
      }
      Operation::CombineNearbyFree => {
        self.heap.coalesce_adjacent_free()?;
        writeln!(out, "=== Combine nearby free blocks ===")?;
      }
    }

    write!(out, "{}", Listing(&self.heap.describe_blocks()?))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::MIN_HEADER_SIZE;

  fn session(capacity: usize) -> Session<Vec<u8>> {
    Session::new(FirstFitHeap::with_region(vec![0; capacity], MIN_HEADER_SIZE).unwrap())
  }

  fn run(
    session: &mut Session<Vec<u8>>,
    input: &str,
  ) -> String {
    let script = Script::parse(input).unwrap();
    let mut out = Vec::new();
    session.run(&script, &mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn test_double_malloc_reported() {
    let mut session = session(64);

    let out = run(&mut session, "2 malloc a 4 malloc a 8");

    assert_eq!(
      out,
      "=== malloc a 4 ===\n\
       Block 01: [OCCP] size =    4 bytes\n\
       === malloc a 8 ===\n\
       malloc Error: a is pointing to some memory address\n"
    );
    assert_eq!(session.heap().describe_blocks().unwrap().len(), 1);
  }

  #[test]
  fn test_free_unbound_reported() {
    let mut session = session(64);

    let out = run(&mut session, "3 malloc b 1 free b free b");

    assert_eq!(
      out,
      "=== malloc b 1 ===\n\
       Block 01: [OCCP] size =    1 byte\n\
       === free b ===\n\
       Block 01: [FREE] size =    1 byte\n\
       === free b ===\n\
       free Error: b is pointing to NULL\n"
    );
    assert_eq!(session.lookup(Name::new('b').unwrap()), None);
  }

  #[test]
  fn test_out_of_memory_reported() {
    let mut session = session(32);

    let out = run(&mut session, "2 malloc a 10 malloc b 20");

    assert_eq!(
      out,
      "=== malloc a 10 ===\n\
       Block 01: [OCCP] size =   10 bytes\n\
       === malloc b 20 ===\n\
       malloc Error: out of memory (29 bytes requested, 13 available)\n"
    );
    assert_eq!(session.lookup(Name::new('b').unwrap()), None);
  }

  #[test]
  fn test_payload_filled_with_spaces() {
    let mut session = session(64);
    run(&mut session, "1 malloc c 6");

    let ptr = session.lookup(Name::new('c').unwrap()).unwrap();

    assert_eq!(session.heap().payload(ptr).unwrap(), b"      ");
  }

  #[test]
  fn test_fill_stops_at_requested_size() {
    let mut session = session(64);
    run(&mut session, "1 malloc a 10");
    let a = session.lookup(Name::new('a').unwrap()).unwrap();
    session.heap.payload_mut(a).unwrap().fill(b'#');

    // `b` reuses all 10 bytes of `a` without a split.
    run(&mut session, "2 free a malloc b 3");

    let b = session.lookup(Name::new('b').unwrap()).unwrap();
    assert_eq!(b, a);
    assert_eq!(session.heap().payload(b).unwrap(), b"   #######");
  }

  #[test]
  fn test_zero_size_reported() {
    let mut session = session(64);

    let out = run(&mut session, "1 malloc a 0");

    assert_eq!(
      out,
      "=== malloc a 0 ===\n\
       malloc Error: allocation size must be greater than zero\n"
    );
  }
}
