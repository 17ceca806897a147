use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Log line layout on stderr.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Installs the global subscriber, writing to stderr so stdout stays free for pulse trains.
///
/// `directives` uses the `RUST_LOG` syntax (`warn`, `toshiba_ac_ir=debug,info`, ...).
/// A non-empty `RUST_LOG` replaces it.
pub fn init_logging(format: LogFormat, directives: &str) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = filter(directives, env.as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false);

    let res = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    res.map_err(|err| anyhow!(err))
}

fn filter(directives: &str, env: Option<&str>) -> Result<EnvFilter> {
    match env.map(str::trim).filter(|env| !env.is_empty()) {
        Some(env) => EnvFilter::try_new(env)
            .with_context(|| format!("invalid {} value {env:?}", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log directives {directives:?}")),
    }
}
