use std::path::{Path, PathBuf};

use anyhow::{Result, Context, bail};
use futures::SinkExt;
use tokio::{fs::OpenOptions, io::AsyncWrite, process::Command};
use tokio_util::codec::FramedWrite;
use tracing::{debug, info, warn};

use crate::config::Target;
use crate::protocol::{codec::PulseTrainCodec, pulse::PulseTrain};


/// Delivers pulse trains to a [`Target`].
#[derive(Clone, Debug)]
pub struct Transmitter {
    target: Target
}

impl Transmitter {
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    pub async fn transmit(&self, train: &PulseTrain) -> Result<()> {
        match &self.target {
            Target::Stdout => {
                write_train(tokio::io::stdout(), train).await
                    .context("failed to write pulse train to stdout")
            },

            Target::File(path) => {
                write_file(path, train, false).await?;
                info!(path = %path.display(), "pulse train written");

                Ok(())
            },

            Target::IrCtl { device, program } => {
                let path = temp_path();
                write_file(&path, train, true).await?;

                let res = run_ir_ctl(program, device, &path).await;

                if let Err(err) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), %err, "failed to remove pulse train file");
                }

                res
            }
        }
    }
}

async fn write_train<W>(writer: W, train: &PulseTrain) -> Result<()> where
    W: AsyncWrite + Unpin
{
    let mut framed = FramedWrite::new(writer, PulseTrainCodec::new());
    framed.send(train).await?;

    Ok(())
}

/// With `exclusive` set the file must not exist yet, so nothing already at `path` is followed or overwritten.
async fn write_file(path: &Path, train: &PulseTrain, exclusive: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);

    if exclusive {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    let file = options.open(path).await
        .with_context(|| format!("failed to create {}", path.display()))?;

    write_train(file, train).await
        .with_context(|| format!("failed to write pulse train to {}", path.display()))
}

async fn run_ir_ctl(program: &Path, device: &Path, path: &Path) -> Result<()> {
    debug!(program = %program.display(), device = %device.display(), "running ir-ctl");

    let status = Command::new(program)
        .arg("-d")
        .arg(device)
        .arg(format!("--send={}", path.display()))
        .status()
        .await
        .with_context(|| format!("failed to run {}", program.display()))?;

    if !status.success() {
        bail!("{} exited with {status}", program.display());
    }

    info!(device = %device.display(), "pulse train sent");

    Ok(())
}

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("toshiba-ir-{:016x}.txt", rand::random::<u64>()))
}
