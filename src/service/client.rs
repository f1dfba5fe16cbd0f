//! Client side: build call → send_receive → unwrap return

use std::io;
use std::marker::PhantomData;

use crate::config::Config;
use crate::core::{Builder, Memory};
use crate::error::Result;
use crate::protocol::Tagged;
use crate::service::{root, Procedure, Service};

/// Synchronous request/response capability
///
/// Satu request menghasilkan tepat satu response. Tidak ada retry atau timeout di layer ini;
/// error transport diteruskan apa adanya.
pub trait Transport {
    /// Sends one encoded request and blocks for its response
    fn send_receive(&mut self, request: &[u8]) -> io::Result<Vec<u8>>;
}

impl<F> Transport for F
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
{
    #[inline]
    fn send_receive(&mut self, request: &[u8]) -> io::Result<Vec<u8>> {
        self(request)
    }
}

/// Calls procedures of service `S` through transport `T`
pub struct Client<S, T> {
    transport: T,
    config: Config,
    _service: PhantomData<fn() -> S>,
}

impl<S: Service, T: Transport> Client<S, T> {
    /// Client with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Client with an explicit configuration
    pub fn with_config(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            _service: PhantomData,
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Gives the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Invokes procedure `P`
    ///
    /// `build_params` constructs the parameter struct in a fresh scratch region. The call union
    /// is built after it, so it lands at the tail of the request.
    pub fn invoke<P, F>(&mut self, build_params: F) -> Result<P::Output>
    where
        P: Procedure<Service = S>,
        F: FnOnce(&mut Builder) -> Result<P::Params>,
    {
        let scratch = Memory::zeroed(self.config.scratch_capacity);
        let mut builder = Builder::with_config(scratch, &self.config);

        let params = build_params(&mut builder)?;
        P::wrap_call(&mut builder, params)?;
        let request = builder.get()?;

        tracing::debug!(
            service = S::NAME,
            procedure = P::NAME,
            request_len = request.len(),
            "calling"
        );
        let response = self.transport.send_receive(&request.bytes())?;
        tracing::debug!(
            procedure = P::NAME,
            response_len = response.len(),
            "response received"
        );

        let ret = root::<S::Return>(Memory::new(response))?;
        ret.expect_alternative(P::TAG)?;
        P::unwrap_return(&ret)
    }
}
