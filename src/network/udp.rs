//! UDP transport: satu datagram per request, satu datagram per response

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};

use super::{blocking, tune_socket_buffers};
use crate::config::Config;
use crate::service::Transport;

const SOCKET_TOKEN: Token = Token(0);
const EVENTS_CAPACITY: usize = 8;

/// Blocking request/response over a connected UDP socket
pub struct UdpTransport {
    poll: Poll,
    events: Events,
    socket: UdpSocket,
    peer: SocketAddr,
    receive_capacity: usize,
    recv_buffer: Box<[u8]>,
}

impl UdpTransport {
    /// Binds an ephemeral local port and connects it to `peer`
    pub fn connect(peer: SocketAddr, config: &Config) -> io::Result<Self> {
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let mut socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;
        tune_socket_buffers(&socket);

        let poll = Poll::new()?;
        poll.registry().register(
            &mut socket,
            SOCKET_TOKEN,
            Interest::READABLE | Interest::WRITABLE,
        )?;

        let local = socket.local_addr()?;
        tracing::debug!(%peer, %local, "udp transport connected");

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            socket,
            peer,
            receive_capacity: config.receive_capacity,
            // satu byte ekstra untuk mendeteksi datagram yang terpotong
            recv_buffer: vec![0u8; config.receive_capacity + 1].into_boxed_slice(),
        })
    }

    /// Local address of the socket
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Address requests are sent to
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn send_receive(&mut self, request: &[u8]) -> io::Result<Vec<u8>> {
        let socket = &self.socket;
        let sent = blocking(&mut self.poll, &mut self.events, || socket.send(request))?;
        if sent != request.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "datagram truncated on send",
            ));
        }

        let buffer = &mut self.recv_buffer;
        let len = blocking(&mut self.poll, &mut self.events, || socket.recv(buffer))?;
        // root ada di ekor buffer: response yang terpotong tidak boleh di-decode
        if len > self.receive_capacity {
            tracing::warn!(
                peer = %self.peer,
                limit = self.receive_capacity,
                "response exceeds receive capacity"
            );
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "response larger than receive capacity of {} bytes",
                    self.receive_capacity
                ),
            ));
        }
        Ok(self.recv_buffer[..len].to_vec())
    }
}
