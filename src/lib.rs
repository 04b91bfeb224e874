//! # firstfit - A Simulated First-Fit Heap
//!
//! This crate implements the classic `malloc`/`free` building blocks over a
//! single fixed-size arena: first-fit search with splitting, lazy free and
//! explicit coalescing of neighbouring free blocks.
//!
//! ## Overview
//!
//! The arena is reserved once and never grows past its capacity. A break
//! offset, moved like `sbrk(2)` moves the program break, separates the bytes
//! already carved into blocks from the untouched tail:
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌────┬──────┬────┬────┬────┬─────────┬─────────────────────────┐   │
//!   │   │ H  │  A   │ H  │ B  │ H  │    C    │        unused           │   │
//!   │   └────┴──────┴────┴────┴────┴─────────┴─────────────────────────┘   │
//!   │   ▲                                    ▲                         ▲   │
//!   │   │                                    │                         │   │
//!   │ start                            current break                  end  │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every block is a header `H` followed by its payload. There are no
//! pointers between blocks: the next header is always `header_size + size`
//! bytes further on, and the last block ends exactly at the break.
//!
//! ## Crate Structure
//!
//! ```text
//!   firstfit
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── arena      - Arena with an sbrk-style break
//!   ├── block      - Header codec, block views and the list walker
//!   ├── config     - HeapConfig (capacity, header size)
//!   ├── error      - HeapError
//!   ├── heap       - FirstFitHeap: allocate, free, coalesce, describe
//!   ├── region     - mmap-backed arena storage
//!   ├── report     - Block listing printer
//!   ├── script     - Operation script reader
//!   └── session    - Name table and script runner
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use firstfit::{FirstFitHeap, HeapConfig, Status};
//!
//! # fn main() -> firstfit::Result<()> {
//! let config = HeapConfig::default().with_heap_size(64);
//! let mut heap = FirstFitHeap::map(&config)?;
//!
//! let a = heap.allocate(20)?;
//! let b = heap.allocate(5)?;
//! heap.payload_mut(b)?.copy_from_slice(b"hello");
//!
//! heap.free(a)?;
//! heap.allocate(3)?; // reuses and splits `a`
//!
//! let blocks = heap.describe_blocks()?;
//! assert_eq!(blocks[1].status, Status::Free);
//! assert_eq!(blocks[1].size, 20 - 3 - config.header_size);
//! # Ok(())
//! # }
//! ```
//!
//! ## Header Layout
//!
//! ```text
//!   ┌───────────────────────────────┬──────────┬─────────────┐
//!   │ size (u64, little endian)     │ status   │ padding     │
//!   │ 8 bytes                       │ 'f'/'o'  │ optional    │
//!   └───────────────────────────────┴──────────┴─────────────┘
//!                                                            ▲
//!                                 payload starts here ───────┘
//! ```
//!
//! The default header is the packed 9 bytes. `HeapConfig::word_aligned()`
//! pads it to the machine word.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No shrinking**: Freed space is never given back to the arena
//! - **Trusting free**: Handles passed to `free` are not checked for
//!   provenance; `Session` does that bookkeeping for scripts

pub mod align;
pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod heap;
pub mod region;
pub mod report;
pub mod script;
pub mod session;

pub use arena::Arena;
pub use block::{BlockPtr, Status};
pub use config::HeapConfig;
pub use error::{HeapError, Result};
pub use heap::{BlockInfo, FirstFitHeap};
pub use region::MmapRegion;
pub use report::Listing;
pub use script::{Operation, Script, ScriptError};
pub use session::{Session, SessionError};
