//! Error taxonomy untuk seluruh runtime
//!
//! Semua operasi yang bisa gagal mengembalikan [`Result`]. Tidak ada clamping diam-diam:
//! akses di luar batas buffer selalu menjadi error.

use std::io;

/// Errors produced while reading, building or exchanging encoded values
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A slice or pointer target falls outside the underlying buffer
    #[error("Out of bounds: offset {offset} with length {len} exceeds {limit} bytes")]
    OutOfBounds {
        /// Requested start, relative to the view (may be negative for pointer targets)
        offset: isize,
        /// Requested length
        len: usize,
        /// Bytes available to the view
        limit: usize,
    },
    /// The builder region has no room left for an allocation
    #[error("Builder exhausted: requested {requested} bytes, {available} available")]
    OutOfSpace {
        /// Bytes requested, including alignment padding
        requested: usize,
        /// Bytes left in the region
        available: usize,
    },
    /// Alignment of zero was requested
    #[error("Alignment must be non-zero")]
    InvalidAlignment,
    /// Wrong number of elements for a fixed-shape value
    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Number of elements the type holds
        expected: usize,
        /// Number of elements supplied
        actual: usize,
    },
    /// Element index past the end of an array or vector
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of elements
        len: usize,
    },
    /// Whole-value reassignment of a reference type
    #[error("Cannot reassign a value of reference type {0}")]
    IllegalMutation(&'static str),
    /// Two views that must share a buffer do not
    #[error("Views do not share the same underlying buffer")]
    ForeignMemory,
    /// Relative pointer offset does not fit the 16-bit wire field
    #[error("Pointer offset {0} does not fit in 16 bits")]
    OffsetOverflow(isize),
    /// Pointer chain too deep to follow, usually a cycle
    #[error("Pointer chain exceeds {0} hops")]
    PointerDepth(usize),
    /// Length does not fit a 16-bit length header
    #[error("Length {0} does not fit in a 16-bit header")]
    TooLong(usize),
    /// String bytes are not UTF-8
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// Union tag does not select the member being read
    #[error("Unexpected alternative: expected {expected}, found {found}")]
    UnexpectedAlternative {
        /// Member the caller asked for
        expected: &'static str,
        /// Tag actually stored
        found: String,
    },
    /// Call union carries a tag no procedure is registered for
    #[error("Unknown procedure tag {0}")]
    UnknownProcedure(String),
    /// The transport failed; the original error is kept as the source
    #[error("Transport failed: {0}")]
    Transport(#[from] io::Error),
}

/// Result alias dipakai di seluruh crate
pub type Result<T> = std::result::Result<T, Error>;
