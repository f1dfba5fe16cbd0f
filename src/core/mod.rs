//! Core module: memory views dan bump allocator
//!
//! Prinsip desain:
//! - Zero-Copy: view hanya menyempitkan range, tidak ada copy
//! - Bounds-checked: akses di luar buffer menjadi error, tidak di-clamp
//! - Single region: semua value satu message hidup di satu buffer

mod builder;
mod memory;

pub use builder::Builder;
pub use memory::Memory;
