use clap::Args;
use eyre::Result;

use crate::codec::{Format, Row};
use crate::io::{read_series, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Output encoding (json, csv)
    #[clap(long, default_value = "json")]
    pub to: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

pub async fn encode(opts: &Opts) -> Result<()> {
    let format = Format::from_name(&opts.to)?;
    let records = read_series(&opts.files).await?;
    let refs: Vec<_> = records.iter().collect();

    let mut output = Output::from_filename(&opts.output).await?;
    output.write(format, &Row::unlabeled(&refs)).await
}
