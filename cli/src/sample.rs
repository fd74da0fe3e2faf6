use clap::Args;
use downsample::{Config, Method};
use eyre::Result;
use tracing::info;

use crate::codec::{Format, Row};
use crate::io::{load_config, read_series, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Target number of output points [default: 500]
    #[clap(long)]
    pub threshold: Option<usize>,

    /// Field to downsample on [default: value]
    #[clap(long, short = 'k')]
    pub key: Option<String>,

    /// Sampler settings file (JSON). Flags take precedence
    #[clap(long)]
    pub config: Option<String>,

    /// Output encoding (json, csv)
    #[clap(long, default_value = "json")]
    pub to: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

impl Opts {
    /// Settings from `--config` (or the defaults) overridden by explicit flags.
    pub async fn resolve(&self, method: Option<Method>) -> Result<Config> {
        let mut config = load_config(self.config.as_deref()).await?;
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(ref key) = self.key {
            config.value_key = key.clone();
        }
        if let Some(method) = method {
            config.method = method;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct MinMaxOpts {
    #[command(flatten)]
    pub common: Opts,

    /// Number of buckets [default: threshold / 2]
    #[clap(long)]
    pub buckets: Option<usize>,
}

pub async fn lttb(opts: &Opts) -> Result<()> {
    let config = opts.resolve(Some(Method::Lttb)).await?;
    let format = Format::from_name(&opts.to)?;
    let series = read_series(&opts.files).await?;

    let sampled = config.apply(&series)?;
    info!(
        input = series.len(),
        output = sampled.len(),
        threshold = config.threshold,
        key = %config.value_key,
        "lttb"
    );

    let mut output = Output::from_filename(&opts.output).await?;
    output.write(format, &Row::unlabeled(&sampled)).await
}

pub async fn min_max(opts: &MinMaxOpts) -> Result<()> {
    let config = opts.common.resolve(Some(Method::MinMax)).await?;
    let format = Format::from_name(&opts.common.to)?;
    let series = read_series(&opts.common.files).await?;

    let buckets = opts.buckets.unwrap_or_else(|| config.min_max_buckets());
    let sampled = downsample::min_max(&series, buckets, &config.value_key)?;
    info!(
        input = series.len(),
        output = sampled.len(),
        buckets,
        key = %config.value_key,
        "min/max"
    );

    let mut output = Output::from_filename(&opts.common.output).await?;
    output.write(format, &Row::unlabeled(&sampled)).await
}
