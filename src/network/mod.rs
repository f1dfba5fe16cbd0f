//! Network Layer: UDP request/response
//!
//! Menggunakan mio untuk cross-platform I/O (epoll/kqueue/IOCP).
//!
//! Fitur:
//! - Satu datagram request → satu datagram response
//! - Blocking dari sisi caller: tidak ada timeout, tidak ada retry
//! - Receive buffer pre-allocated, ukurannya dari `Config`

mod server;
mod udp;

pub use server::UdpServer;
pub use udp::UdpTransport;

use std::io;

use mio::{Events, Poll};

/// Socket send/receive buffer yang diminta ke kernel
const SOCKET_BUFFER_SIZE: usize = 256 * 1024;

/// Memperbesar SO_SNDBUF / SO_RCVBUF (best effort)
#[cfg(unix)]
fn tune_socket_buffers<S: std::os::unix::io::AsRawFd>(socket: &S) {
    let fd = socket.as_raw_fd();
    let optval = SOCKET_BUFFER_SIZE as libc::c_int;
    // SAFETY: fd valid selama `socket` hidup, optval adalah c_int
    unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_SNDBUF,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        );
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVBUF,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        );
    }
}

#[cfg(not(unix))]
fn tune_socket_buffers<S>(_socket: &S) {}

/// Retries `op` until it stops returning `WouldBlock`, polling in between
///
/// mio edge-triggered: operasi selalu dicoba dulu, baru menunggu event.
fn blocking<T>(
    poll: &mut Poll,
    events: &mut Events,
    mut op: impl FnMut() -> io::Result<T>,
) -> io::Result<T> {
    loop {
        match op() {
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }

        match poll.poll(events, None) {
            Ok(()) => {}
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}
