use clap::Parser;

/// HTTP mock double: answers every request with the next queued response.
#[derive(Clone, Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ServerOptions {
    /// Address the mock server listens on.
    #[clap(long, env = "MOCK_ADDR", default_value = "0.0.0.0:8010")]
    pub mock_addr: String,
    /// Address the control server (JSON-RPC and /healthz) listens on.
    #[clap(long, env = "CONTROL_ADDR", default_value = "0.0.0.0:8020")]
    pub control_addr: String,
    /// Worker threads per server. Defaults to the number of CPUs.
    #[clap(long, env = "WORKERS")]
    pub workers: Option<usize>,
}


pub fn parse_options() -> ServerOptions {
    Parser::parse()
}
