//! Runtime configuration
//!
//! Semua konstanta yang sebelumnya hard-coded (sentinel builder, ukuran scratch buffer per call,
//! ukuran receive buffer) dikumpulkan di sini.

/// Byte yang mengisi setiap alokasi baru, supaya state yang belum diinisialisasi terlihat
pub const DEFAULT_SENTINEL: u8 = 0xCC;

/// Kapasitas scratch region untuk satu outbound call
pub const DEFAULT_SCRATCH_CAPACITY: usize = 1024;

/// Ukuran maksimum datagram response yang diterima
pub const DEFAULT_RECEIVE_CAPACITY: usize = 2048;

/// Runtime configuration shared by builders, clients and the UDP endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Fill byte for freshly allocated builder memory
    pub sentinel: u8,
    /// Size of the zeroed region each call (and each response) is built in
    pub scratch_capacity: usize,
    /// Size of the datagram receive buffer
    pub receive_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            receive_capacity: DEFAULT_RECEIVE_CAPACITY,
        }
    }
}

impl Config {
    /// Override the sentinel fill byte
    pub fn with_sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Override the per-call scratch capacity
    pub fn with_scratch_capacity(mut self, capacity: usize) -> Self {
        self.scratch_capacity = capacity;
        self
    }

    /// Override the receive buffer size
    pub fn with_receive_capacity(mut self, capacity: usize) -> Self {
        self.receive_capacity = capacity;
        self
    }
}
