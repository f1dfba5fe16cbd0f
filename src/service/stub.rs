//! `lidl_service!`: service descriptor, client stub, handler trait dan server dispatcher

/// Declares a service over existing call/return unions
///
/// Setiap procedure:
/// ```text
/// Name = TAG => fn method(arg: NativeType, ...) -> NativeReturn as WireReturn {
///     params: ParamsStruct, call: call_getter / call_constructor,
///     results: ResultsStruct, return: return_getter / return_constructor,
/// }
/// ```
///
/// `ResultsStruct` harus punya member `ret0` bertipe `WireReturn`.
///
/// Generated:
/// - `service` marker yang meng-implement [`Service`](crate::Service)
/// - satu marker per procedure yang meng-implement [`Procedure`](crate::Procedure)
/// - `client`: stub dengan satu method per procedure (argumen di-marshal otomatis)
/// - `handler`: trait yang diimplementasikan server
/// - `server`: wrapper `Server(handler)` yang meng-implement [`Dispatch`](crate::Dispatch)
#[macro_export]
macro_rules! lidl_service {
    (
        $(#[$meta:meta])*
        $vis:vis service $svc:ident {
            tag: $tag:ty,
            call: $call:ty,
            return: $ret:ty,
            client: $client:ident,
            handler: $handler:ident,
            server: $server:ident,
            procedures {
                $(
                    $(#[$pmeta:meta])*
                    $proc:ident = $variant:ident => fn $method:ident(
                        $( $arg:ident : $argty:ty ),* $(,)?
                    ) -> $native:ty as $wire:ty {
                        params: $params:ty, call: $cget:ident / $cnew:ident,
                        results: $results:ty, return: $rget:ident / $rnew:ident $(,)?
                    }
                )*
            }
        }
    ) => {
        $(#[$meta])*
        $vis struct $svc;

        impl $crate::Service for $svc {
            const NAME: &'static str = stringify!($svc);
            const PROCEDURES: &'static [&'static str] = &[$( stringify!($method) ),*];

            type Tag = $tag;
            type Call = $call;
            type Return = $ret;
        }

        $(
            $(#[$pmeta])*
            $vis struct $proc;

            impl $crate::Procedure for $proc {
                type Service = $svc;
                const NAME: &'static str = stringify!($method);
                const TAG: $tag = <$tag>::$variant;

                type Params = $params;
                type Output = $native;

                fn wrap_call(builder: &mut $crate::Builder, params: $params) -> $crate::Result<$call> {
                    <$call>::$cnew(builder, params)
                }

                fn unwrap_call(call: &$call) -> $crate::Result<$params> {
                    call.$cget()
                }

                fn wrap_return(builder: &mut $crate::Builder, output: $native) -> $crate::Result<$ret> {
                    let ret0 = $crate::Marshal::marshal(output, builder)?;
                    let results = <$results>::create(builder, ret0)?;
                    <$ret>::$rnew(builder, results)
                }

                fn unwrap_return(ret: &$ret) -> $crate::Result<$native> {
                    let results = ret.$rget()?;
                    let ret0: $wire = results.ret0()?;
                    $crate::Decode::decode(&ret0)
                }
            }
        )*

        /// Client stub
        $vis struct $client<T> {
            inner: $crate::Client<$svc, T>,
        }

        #[allow(dead_code)]
        impl<T: $crate::Transport> $client<T> {
            /// Stub with the default configuration
            pub fn new(transport: T) -> Self {
                Self {
                    inner: $crate::Client::new(transport),
                }
            }

            /// Stub with an explicit configuration
            pub fn with_config(transport: T, config: $crate::Config) -> Self {
                Self {
                    inner: $crate::Client::with_config(transport, config),
                }
            }

            /// The generic client underneath
            pub fn inner(&mut self) -> &mut $crate::Client<$svc, T> {
                &mut self.inner
            }

            /// Gives the transport back
            pub fn into_transport(self) -> T {
                self.inner.into_transport()
            }

            $(
                pub fn $method(&mut self, $( $arg: $argty ),*) -> $crate::Result<$native> {
                    self.inner.invoke::<$proc, _>(move |builder| {
                        $( let $arg = $crate::Marshal::marshal($arg, builder)?; )*
                        <$params>::create(builder, $( $arg ),*)
                    })
                }
            )*
        }

        /// Server-side implementation of the service
        $vis trait $handler {
            $(
                fn $method(
                    &mut self,
                    params: $params,
                    builder: &mut $crate::Builder,
                ) -> $crate::Result<$native>;
            )*
        }

        /// Dispatches calls to a handler
        $vis struct $server<H>(pub H);

        impl<H: $handler> $crate::Dispatch for $server<H> {
            fn dispatch(
                &mut self,
                request: $crate::Memory,
                builder: &mut $crate::Builder,
            ) -> $crate::Result<()> {
                let call = $crate::root::<$call>(request)?;
                let tag = $crate::Tagged::alternative(&call)?;
                $(
                    if tag == <$proc as $crate::Procedure>::TAG {
                        let handler = &mut self.0;
                        return $crate::serve::<$proc, _>(&call, builder, |params, builder| {
                            handler.$method(params, builder)
                        });
                    }
                )*
                Err($crate::Error::UnknownProcedure(::std::format!("{:?}", tag)))
            }
        }
    };
}
