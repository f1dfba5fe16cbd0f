//! lidl Calculator - contoh service di atas UDP
//!
//! Satu binary untuk dua peran:
//! - `server`: UdpServer dengan handler Calculator
//! - `call`: client stub, satu call lalu exit
//!
//! Usage:
//!   cargo run --release --bin lidl_calc -- server [OPTIONS]
//!   cargo run --release --bin lidl_calc -- call add 40 2 [OPTIONS]

use std::net::SocketAddr;
use std::process;

use lidl::{Builder, Config, Decode, UdpServer, UdpTransport, Vector, I32, U32, U8};
use tracing_subscriber::EnvFilter;

lidl::lidl_enum! {
    pub enum CalcOp: u8 {
        ADD = 0,
        MUL = 1,
        ECHO = 2,
        SUM = 3,
    }
}

lidl::lidl_struct! {
    pub struct BinaryParams(size = 8, align = 4) {
        [0] a: I32 => set_a,
        [4] b: I32 => set_b,
    }
}

lidl::lidl_struct! {
    pub struct EchoParams(size = 2, align = 2) {
        [0] text: lidl::String => set_text,
    }
}

lidl::lidl_struct! {
    pub struct SumParams(size = 2, align = 2) {
        [0] data: Vector<U8> => set_data,
    }
}

lidl::lidl_struct! {
    pub struct IntResults(size = 4, align = 4) {
        [0] ret0: I32 => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct TextResults(size = 2, align = 2) {
        [0] ret0: lidl::String => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct SumResults(size = 4, align = 4) {
        [0] ret0: U32 => set_ret0,
    }
}

lidl::lidl_union! {
    pub union CalcCall(size = 12, align = 4) {
        [0] alternative: CalcOp;
        [4] add: BinaryParams => create_add = ADD,
        [4] mul: BinaryParams => create_mul = MUL,
        [4] echo: EchoParams => create_echo = ECHO,
        [4] sum: SumParams => create_sum = SUM,
    }
}

lidl::lidl_union! {
    pub union CalcReturn(size = 8, align = 4) {
        [0] alternative: CalcOp;
        [4] add: IntResults => create_add = ADD,
        [4] mul: IntResults => create_mul = MUL,
        [4] echo: TextResults => create_echo = ECHO,
        [4] sum: SumResults => create_sum = SUM,
    }
}

lidl::lidl_service! {
    pub service Calculator {
        tag: CalcOp,
        call: CalcCall,
        return: CalcReturn,
        client: CalculatorClient,
        handler: CalculatorHandler,
        server: CalculatorServer,
        procedures {
            Add = ADD => fn add(a: i32, b: i32) -> i32 as I32 {
                params: BinaryParams, call: add / create_add,
                results: IntResults, return: add / create_add,
            }
            Mul = MUL => fn mul(a: i32, b: i32) -> i32 as I32 {
                params: BinaryParams, call: mul / create_mul,
                results: IntResults, return: mul / create_mul,
            }
            Echo = ECHO => fn echo(text: &str) -> String as lidl::String {
                params: EchoParams, call: echo / create_echo,
                results: TextResults, return: echo / create_echo,
            }
            Sum = SUM => fn sum(data: Vec<u8>) -> u32 as U32 {
                params: SumParams, call: sum / create_sum,
                results: SumResults, return: sum / create_sum,
            }
        }
    }
}

struct Calc;

impl CalculatorHandler for Calc {
    fn add(&mut self, params: BinaryParams, _builder: &mut Builder) -> lidl::Result<i32> {
        Ok(params.a()?.get().wrapping_add(params.b()?.get()))
    }

    fn mul(&mut self, params: BinaryParams, _builder: &mut Builder) -> lidl::Result<i32> {
        Ok(params.a()?.get().wrapping_mul(params.b()?.get()))
    }

    fn echo(&mut self, params: EchoParams, _builder: &mut Builder) -> lidl::Result<String> {
        params.text()?.value()
    }

    fn sum(&mut self, params: SumParams, _builder: &mut Builder) -> lidl::Result<u32> {
        Ok(params.data()?.decode()?.into_iter().map(u32::from).sum())
    }
}

/// Command line configuration
struct CliConfig {
    mode: String,
    addr: String,
    procedure: String,
    args: Vec<String>,
    lidl: Config,
    count: Option<usize>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mode: String::new(),
            addr: "127.0.0.1:9999".to_string(),
            procedure: String::new(),
            args: Vec::new(),
            lidl: Config::default(),
            count: None,
        }
    }
}

fn print_help() {
    println!("lidl Calculator - UDP service demo\n");
    println!("Usage:");
    println!("  lidl_calc server [OPTIONS]");
    println!("  lidl_calc call <add|mul|echo|sum> <ARGS>... [OPTIONS]\n");
    println!("Options:");
    println!("  -a, --addr <ADDR>       Server address (default: 127.0.0.1:9999)");
    println!("      --scratch <BYTES>   Scratch region per message (default: 1024)");
    println!("      --recv <BYTES>      Receive buffer (default: 2048)");
    println!("      --sentinel <BYTE>   Fill byte for fresh allocations (default: 204)");
    println!("  -n, --count <N>         Server: exit after N requests");
    println!("  -h, --help              Show this help");
}

fn parse_args() -> CliConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = CliConfig::default();
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" | "-a" => {
                if i + 1 < args.len() {
                    config.addr = args[i + 1].clone();
                    i += 1;
                }
            }
            "--scratch" => {
                if i + 1 < args.len() {
                    let bytes = args[i + 1].parse().unwrap_or(lidl::config::DEFAULT_SCRATCH_CAPACITY);
                    config.lidl = config.lidl.with_scratch_capacity(bytes);
                    i += 1;
                }
            }
            "--recv" => {
                if i + 1 < args.len() {
                    let bytes = args[i + 1].parse().unwrap_or(lidl::config::DEFAULT_RECEIVE_CAPACITY);
                    config.lidl = config.lidl.with_receive_capacity(bytes);
                    i += 1;
                }
            }
            "--sentinel" => {
                if i + 1 < args.len() {
                    let byte = args[i + 1].parse().unwrap_or(lidl::config::DEFAULT_SENTINEL);
                    config.lidl = config.lidl.with_sentinel(byte);
                    i += 1;
                }
            }
            "--count" | "-n" => {
                if i + 1 < args.len() {
                    config.count = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    config.mode = positional.next().unwrap_or_default();
    if config.mode == "call" {
        config.procedure = positional.next().unwrap_or_default();
    }
    config.args = positional.collect();
    config
}

fn parse_i32(args: &[String], index: usize) -> Result<i32, String> {
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing argument #{}", index + 1))?;
    raw.parse()
        .map_err(|e| format!("argument #{} ({}): {}", index + 1, raw, e))
}

fn run_server(config: &CliConfig, addr: SocketAddr) -> Result<(), String> {
    let mut server = UdpServer::bind(addr, CalculatorServer(Calc), config.lidl)
        .map_err(|e| format!("bind {}: {}", addr, e))?;
    let local = server.local_addr().map_err(|e| e.to_string())?;
    println!("🚀 lidl Calculator listening on {}", local);

    match config.count {
        Some(count) => server.serve(count).map_err(|e| e.to_string())?,
        None => server.run().map_err(|e| e.to_string())?,
    }

    println!("\n📊 Server Stats");
    println!("   Served:   {}", server.served());
    println!("   Dropped:  {}", server.dropped());
    Ok(())
}

fn run_call(config: &CliConfig, addr: SocketAddr) -> Result<(), String> {
    let transport =
        UdpTransport::connect(addr, &config.lidl).map_err(|e| format!("connect {}: {}", addr, e))?;
    let mut client = CalculatorClient::with_config(transport, config.lidl);
    let args = &config.args;

    let answer = match config.procedure.as_str() {
        "add" => client
            .add(parse_i32(args, 0)?, parse_i32(args, 1)?)
            .map(|v| v.to_string()),
        "mul" => client
            .mul(parse_i32(args, 0)?, parse_i32(args, 1)?)
            .map(|v| v.to_string()),
        "echo" => client.echo(&args.join(" ")),
        "sum" => {
            let data = args
                .iter()
                .map(|a| a.parse::<u8>().map_err(|e| format!("{}: {}", a, e)))
                .collect::<Result<Vec<u8>, String>>()?;
            client.sum(data).map(|v| v.to_string())
        }
        other => return Err(format!("unknown procedure '{}'", other)),
    };

    println!("{}", answer.map_err(|e| e.to_string())?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = parse_args();
    let addr: SocketAddr = match config.addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("❌ Invalid address '{}': {}", config.addr, e);
            process::exit(2);
        }
    };

    let result = match config.mode.as_str() {
        "server" => run_server(&config, addr),
        "call" => run_call(&config, addr),
        _ => {
            print_help();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
