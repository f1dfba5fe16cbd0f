//! UDP server dengan event-driven I/O
//!
//! Satu socket, satu dispatcher. Request yang gagal di-decode atau ditolak handler hanya
//! di-log dan tidak dibalas: caller yang butuh timeout harus membungkus transport-nya sendiri.

use std::io;
use std::net::SocketAddr;

use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token};

use super::{blocking, tune_socket_buffers};
use crate::config::Config;
use crate::service::{respond, Dispatch};

const SERVER_TOKEN: Token = Token(0);
const EVENTS_CAPACITY: usize = 64;

/// Serves a [`Dispatch`] implementation over UDP
pub struct UdpServer<D> {
    poll: Poll,
    events: Events,
    socket: UdpSocket,
    dispatcher: D,
    config: Config,
    recv_buffer: Box<[u8]>,
    served: u64,
    dropped: u64,
}

impl<D: Dispatch> UdpServer<D> {
    /// Binds the server socket
    pub fn bind(addr: SocketAddr, dispatcher: D, config: Config) -> io::Result<Self> {
        let poll = Poll::new()?;

        let mut socket = UdpSocket::bind(addr)?;
        tune_socket_buffers(&socket);
        poll.registry().register(
            &mut socket,
            SERVER_TOKEN,
            Interest::READABLE | Interest::WRITABLE,
        )?;

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            socket,
            dispatcher,
            recv_buffer: vec![0u8; config.receive_capacity + 1].into_boxed_slice(),
            config,
            served: 0,
            dropped: 0,
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// The dispatcher
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Requests answered so far
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Requests dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Serves requests forever
    pub fn run(&mut self) -> io::Result<()> {
        let addr = self.socket.local_addr()?;
        tracing::info!(%addr, "lidl server listening");
        loop {
            self.serve_one()?;
        }
    }

    /// Handles exactly `count` request datagrams, answered or dropped
    pub fn serve(&mut self, count: usize) -> io::Result<()> {
        for _ in 0..count {
            self.serve_one()?;
        }
        Ok(())
    }

    fn serve_one(&mut self) -> io::Result<()> {
        let socket = &self.socket;
        let buffer = &mut self.recv_buffer;
        let (len, peer) = blocking(&mut self.poll, &mut self.events, || socket.recv_from(buffer))?;

        if len > self.config.receive_capacity {
            self.dropped += 1;
            tracing::warn!(
                %peer,
                limit = self.config.receive_capacity,
                "request exceeds receive capacity, dropped"
            );
            return Ok(());
        }

        let request = &self.recv_buffer[..len];
        match respond(&mut self.dispatcher, request, &self.config) {
            Ok(response) => {
                let socket = &self.socket;
                blocking(&mut self.poll, &mut self.events, || {
                    socket.send_to(&response, peer)
                })?;
                self.served += 1;
                tracing::debug!(%peer, request_len = len, response_len = response.len(), "answered");
            }
            Err(err) => {
                self.dropped += 1;
                tracing::warn!(%peer, request_len = len, error = %err, "request dropped");
            }
        }
        Ok(())
    }
}
