use std::path::PathBuf;

use anyhow::{Result, Context, bail};
use url::Url;


pub const DEFAULT_IR_CTL: &str = "ir-ctl";


/// Where a pulse train is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Write to standard output.
    Stdout,

    /// Write to a file, replacing its contents.
    File(PathBuf),

    /// Hand off to `ir-ctl` for transmission on a LIRC device.
    IrCtl {
        device: PathBuf,
        program: PathBuf
    }
}

impl Target {
    /// Parse a target URL.
    ///
    /// `stdout:`, `file:///path/to/file` and `ir-ctl:///dev/lirc0` URLs are supported.
    /// `ir-ctl` accepts a `bin` query parameter to use another executable.
    pub fn from_url(url: &Url) -> Result<Self> {
        match url.scheme() {
            "stdout" => Ok(Self::Stdout),

            "file" => {
                let path = url.to_file_path()
                    .map_err(|_| anyhow::anyhow!("file url must have an absolute path: {url}"))?;

                Ok(Self::File(path))
            },

            "ir-ctl" => {
                let device = url.path();
                if device.is_empty() || device == "/" {
                    bail!("ir-ctl requires a device path to be specified in the url: {url}");
                }

                let program = url.query_pairs()
                    .find(|(key, _)| key == "bin")
                    .map(|(_, value)| PathBuf::from(value.as_ref()))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_IR_CTL));

                Ok(Self::IrCtl {
                    device: PathBuf::from(device),
                    program
                })
            },

            other => {
                bail!("url scheme {other} not supported");
            }
        }
    }

    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .with_context(|| format!("invalid target url: {url}"))?;

        Self::from_url(&url)
    }
}

impl std::str::FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
