use clap::Args;
use downsample::Method;
use eyre::Result;
use tracing::info;

use crate::codec::{Format, Row};
use crate::io::{read_labeled, Output};
use crate::sample;

#[derive(Args, Debug)]
pub struct Opts {
    #[command(flatten)]
    pub common: sample::Opts,

    /// Sampling method (lttb, minmax) [default: lttb]
    #[clap(long)]
    pub method: Option<Method>,

    /// Series labels, one per input in order [default: file stem]
    #[clap(long = "label", short = 'l')]
    pub labels: Vec<String>,

    /// Worker threads for per-series sampling
    #[clap(long, default_value_t = num_cpus::get())]
    pub workers: usize,
}

pub async fn multi(opts: &Opts) -> Result<()> {
    let config = opts.common.resolve(opts.method).await?;
    let format = Format::from_name(&opts.common.to)?;
    let set = read_labeled(&opts.common.files, &opts.labels).await?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.workers)
        .build()?;
    let reduced = pool.install(|| config.apply_multi(&set))?;

    let mut rows: Vec<Row> = Vec::new();
    for (series, input) in reduced.iter().zip(&set) {
        info!(
            label = series.label,
            input = input.series.len(),
            output = series.len(),
            method = %config.method,
            "multi-series"
        );
        rows.extend(Row::labeled(series.label, &series.series));
    }

    let mut output = Output::from_filename(&opts.common.output).await?;
    output.write(format, &rows).await
}
