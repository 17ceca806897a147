use anyhow::Result;
use clap::{Parser, Subcommand};
use toshiba_ac_ir::{
    config::Target,
    logging::{init_logging, LogFormat},
    protocol::{command::{Command, FanSpeed, Mode, SpecialMode, Unit}, frame::Frame, pulse::PulseTrain},
    transmit::Transmitter,
};


/// Send a command to a Toshiba air conditioner over infrared
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to send the pulse train
    ///
    /// stdout:, file:///path or ir-ctl:///dev/lircN URLs supported
    #[arg(long, env = "TOSHIBA_IR_TARGET", default_value = "stdout:")]
    target: Target,

    /// Log filter directives, e.g. `debug` or `toshiba_ac_ir=trace,warn` (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Set operating mode, fan speed and temperature
    Mode {
        #[arg(long, value_enum)]
        unit: Unit,

        #[arg(long, value_enum)]
        mode: Mode,

        #[arg(long, value_enum, default_value_t = FanSpeed::Auto)]
        fan: FanSpeed,

        /// Setpoint in degrees Celsius (17 to 30)
        #[arg(long, allow_negative_numbers = true)]
        temperature: i32,

        #[arg(long, value_enum, default_value_t = SpecialMode::None)]
        special: SpecialMode,
    },

    /// Fix the louver in place
    Fix {
        #[arg(long, value_enum)]
        unit: Unit,
    },

    /// Swing the louver
    Swing {
        #[arg(long, value_enum)]
        unit: Unit,
    },
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        match cmd {
            Cmd::Mode { unit, mode, fan, temperature, special } => {
                Command::ModeFanTemp { unit, mode, fan, temperature, special }
            },
            Cmd::Fix { unit } => Command::Fix { unit },
            Cmd::Swing { unit } => Command::Swing { unit },
        }
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_format, &args.log)?;

    let command = Command::from(args.command);
    let frame = Frame::from_command(&command)?;
    let train = PulseTrain::from(&frame);

    Transmitter::new(args.target).transmit(&train).await?;

    Ok(())
}
