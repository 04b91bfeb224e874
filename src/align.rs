/// Rounds `value` up to the next multiple of `align`, which must be a power
/// of two.
///
/// # Examples
///
/// ```rust
/// use firstfit::align_to;
///
/// assert_eq!(align_to!(9, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(0, 4), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Rounds `value` up to the machine word size.
///
/// Used to derive header sizes whose payloads start word aligned.
///
/// # Examples
///
/// ```rust
/// use firstfit::align;
///
/// match core::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(9), 16), // 64 bit machine.
///     4 => assert_eq!(align!(9), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}
