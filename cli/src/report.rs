use std::io::Write;

use clap::Args;
use downsample::{lttb, min_max, Config, Point};
use eyre::Result;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::warn;

use crate::codec::{Record, Timestamp};
use crate::io::{load_config, sources, Input, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Report type (text, json)
    #[clap(long, name = "type", default_value = "text")]
    pub report_type: String,

    /// Target number of output points [default: 500]
    #[clap(long)]
    pub threshold: Option<usize>,

    /// Field to summarize [default: value]
    #[clap(long, short = 'k')]
    pub key: Option<String>,

    /// Sampler settings file (JSON). Flags take precedence
    #[clap(long)]
    pub config: Option<String>,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

/// What each sampler would make of one input.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub label: String,
    pub samples: usize,
    pub invalid: usize,
    pub sorted: bool,
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
    pub lttb: usize,
    pub min_max: usize,
}

impl Summary {
    pub fn new(label: String, series: &[Record], config: &Config) -> Result<Self> {
        let key = config.value_key.as_str();
        Ok(Summary {
            label,
            samples: series.len(),
            invalid: series.iter().filter(|s| s.value(key).is_none()).count(),
            sorted: series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            first: series.first().map(|s| s.timestamp.clone()),
            last: series.last().map(|s| s.timestamp.clone()),
            lttb: lttb(series, config.threshold, key)?.len(),
            min_max: min_max(series, config.min_max_buckets(), key)?.len(),
        })
    }
}

pub async fn report(opts: &Opts) -> Result<()> {
    let mut config = load_config(opts.config.as_deref()).await?;
    if let Some(threshold) = opts.threshold {
        config.threshold = threshold;
    }
    if let Some(ref key) = opts.key {
        config.value_key = key.clone();
    }

    let mut summaries = Vec::new();
    for source in sources(&opts.files) {
        let mut input = Input::from_filename(&source).await?;
        let series = input.read_records().await?;
        let summary = Summary::new(input.label(), &series, &config)?;
        if !summary.sorted {
            warn!(input = %source, "timestamps are not sorted; samplers do not reorder");
        }
        summaries.push(summary);
    }

    let mut buf = Vec::new();
    match opts.report_type.as_str() {
        "text" => report_text(&summaries, &config, &mut buf)?,
        "json" => report_json(&summaries, &mut buf)?,
        other => eyre::bail!("unknown report type: {}", other),
    }

    let mut output = Output::from_filename(&opts.output).await?;
    output.write_all(&buf).await
}

fn optional(ts: &Option<Timestamp>) -> String {
    ts.as_ref().map_or_else(|| "-".to_string(), Timestamp::to_string)
}

pub fn report_text(summaries: &[Summary], config: &Config, w: &mut dyn Write) -> Result<()> {
    let mut tw = TabWriter::new(w);
    writeln!(
        tw,
        "Label\tSamples\tInvalid\tSorted\tFirst\tLast\tLTTB [{}]\tMinMax [{}]",
        config.threshold,
        config.min_max_buckets()
    )?;
    for s in summaries {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.label,
            s.samples,
            s.invalid,
            s.sorted,
            optional(&s.first),
            optional(&s.last),
            s.lttb,
            s.min_max
        )?;
    }
    tw.flush()?;
    Ok(())
}

pub fn report_json(summaries: &[Summary], w: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *w, summaries)?;
    writeln!(w)?;
    Ok(())
}
