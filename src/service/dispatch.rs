//! Server side: locate call union → handler → build return union last

use crate::config::Config;
use crate::core::{Builder, Memory};
use crate::error::Result;
use crate::protocol::Tagged;
use crate::service::{Procedure, Service};

/// Answers one encoded request by building a response into `builder`
pub trait Dispatch {
    /// Decodes the call in `request` and builds the matching return union into `builder`
    fn dispatch(&mut self, request: Memory, builder: &mut Builder) -> Result<()>;
}

impl<D: Dispatch + ?Sized> Dispatch for &mut D {
    fn dispatch(&mut self, request: Memory, builder: &mut Builder) -> Result<()> {
        (**self).dispatch(request, builder)
    }
}

/// Runs one handler for procedure `P`
///
/// Return union dibangun paling akhir sehingga menjadi root di tail response.
pub fn serve<P, F>(
    call: &<P::Service as Service>::Call,
    builder: &mut Builder,
    handler: F,
) -> Result<()>
where
    P: Procedure,
    F: FnOnce(P::Params, &mut Builder) -> Result<P::Output>,
{
    call.expect_alternative(P::TAG)?;
    let params = P::unwrap_call(call)?;
    let output = handler(params, builder)?;
    P::wrap_return(builder, output)?;

    tracing::debug!(procedure = P::NAME, response_len = builder.position(), "served");
    Ok(())
}

/// Encodes the response to `request` in a fresh scratch region
pub fn respond<D: Dispatch + ?Sized>(
    dispatcher: &mut D,
    request: &[u8],
    config: &Config,
) -> Result<Vec<u8>> {
    let scratch = Memory::zeroed(config.scratch_capacity);
    let mut builder = Builder::with_config(scratch, config);
    dispatcher.dispatch(Memory::new(request.to_vec()), &mut builder)?;
    Ok(builder.get()?.to_vec())
}
