use anyhow::Result;
use clap::Parser;
use toshiba_ac_ir::{
    config::Target,
    logging::{init_logging, LogFormat},
    server::{Server, DEFAULT_LISTEN},
    transmit::Transmitter,
};


/// Accept Toshiba air conditioner commands over the network
///
/// Clients send one JSON request per line and receive one JSON response per line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address and port to listen on (host:port)
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Shared secret clients must send in the `token` field
    #[arg(long, env = "TOSHIBA_IR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Where to send pulse trains
    ///
    /// stdout:, file:///path or ir-ctl:///dev/lircN URLs supported
    #[arg(long, env = "TOSHIBA_IR_TARGET", default_value = "ir-ctl:///dev/lirc0")]
    target: Target,

    /// Log filter directives, e.g. `debug` or `toshiba_ac_ir=trace,warn` (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}


#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_format, &args.log)?;

    if args.token.is_none() {
        tracing::warn!("no token configured, accepting requests from any client");
    }

    let server = Server::bind(&args.listen, args.token, Transmitter::new(args.target)).await?;
    server.run().await
}
