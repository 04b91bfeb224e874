//! Reader for allocation scripts.
//!
//! ```text
//! 5
//! malloc a 10
//! malloc b 5
//! free a
//! malloc c 3
//! combine_nearby_free
//! ```
//!
//! The first token is the number of operations that follow. Tokens are
//! separated by any whitespace.

use std::{fmt, str::FromStr};

use thiserror::Error;

pub const MALLOC: &str = "malloc";
pub const FREE: &str = "free";
pub const COMBINE_NEARBY_FREE: &str = "combine_nearby_free";

const MAX_PREALLOCATED: usize = 1024;

/// Number of distinct block names (`a` to `z`).
pub const NAME_SLOTS: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
  #[error("script is empty, expected an operation count")]
  MissingCount,

  #[error("invalid operation count {token:?}")]
  InvalidCount { token: String },

  #[error("script ends after {found} of {expected} operations")]
  Truncated { expected: usize, found: usize },

  #[error("operation {op}: unknown command {word:?}")]
  UnknownCommand { op: usize, word: String },

  #[error("operation {op}: block name must be a single letter a-z, got {token:?}")]
  InvalidName { op: usize, token: String },

  #[error("operation {op}: invalid size {token:?}")]
  InvalidSize { op: usize, token: String },
}

/// A block name, `a` through `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(u8);

impl Name {
  pub fn new(letter: char) -> Option<Self> {
    letter.is_ascii_lowercase().then_some(Self(letter as u8))
  }

  /// Slot in a 26-entry table.
  pub fn slot(self) -> usize {
    (self.0 - b'a') as usize
  }

  pub fn letter(self) -> char {
    self.0 as char
  }
}

impl fmt::Display for Name {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}", self.letter())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Malloc { name: Name, size: usize },
  Free { name: Name },
  CombineNearbyFree,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
  pub operations: Vec<Operation>,
}

impl Script {
  pub fn parse(input: &str) -> Result<Self, ScriptError> {
    let mut tokens = input.split_whitespace();

    let count_token = tokens.next().ok_or(ScriptError::MissingCount)?;
    let expected: usize = count_token.parse().map_err(|_| ScriptError::InvalidCount {
      token: count_token.to_string(),
    })?;

    let mut operations = Vec::with_capacity(expected.min(MAX_PREALLOCATED));
    for op in 1..=expected {
      let truncated = ScriptError::Truncated {
        expected,
        found: op - 1,
      };
      let word = tokens.next().ok_or_else(|| truncated.clone())?;

      let operation = match word {
        MALLOC => {
          let name = parse_name(op, tokens.next().ok_or_else(|| truncated.clone())?)?;
          let token = tokens.next().ok_or(truncated)?;
          let size = token.parse().map_err(|_| ScriptError::InvalidSize {
            op,
            token: token.to_string(),
          })?;
          Operation::Malloc { name, size }
        }
        FREE => Operation::Free {
          name: parse_name(op, tokens.next().ok_or(truncated)?)?,
        },
        COMBINE_NEARBY_FREE => Operation::CombineNearbyFree,
        other => {
          return Err(ScriptError::UnknownCommand {
            op,
            word: other.to_string(),
          });
        }
      };
      operations.push(operation);
    }

    if tokens.next().is_some() {
      log::debug!("[script] ignoring input after {} operations", expected);
    }

    Ok(Self { operations })
  }
}

impl FromStr for Script {
  type Err = ScriptError;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    Self::parse(input)
  }
}

fn parse_name(
  op: usize,
  token: &str,
) -> Result<Name, ScriptError> {
  let mut chars = token.chars();
  match (chars.next().and_then(Name::new), chars.next()) {
    (Some(name), None) => Ok(name),
    _ => Err(ScriptError::InvalidName {
      op,
      token: token.to_string(),
    }),
  }
}
