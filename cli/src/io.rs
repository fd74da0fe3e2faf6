use std::path::Path;

use downsample::{Config, LabeledSeries};
use eyre::{Result, WrapErr};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt as _, BufReader, BufWriter};
use tracing::{debug, warn};

use crate::codec::{Format, Record, Row};

pub struct Input {
    pub name: String,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
}

impl Input {
    pub async fn from_filename(name: &str) -> Result<Self> {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match name {
            "stdin" => Box::new(BufReader::new(tokio::io::stdin())),
            _ => {
                let f = File::open(name)
                    .await
                    .wrap_err_with(|| format!("opening {}", name))?;
                Box::new(BufReader::new(f))
            }
        };
        Ok(Input {
            name: name.to_string(),
            reader,
        })
    }

    /// Series label for this input: the file stem, or `stdin`.
    pub fn label(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Reads every record, auto-detecting the encoding. Empty input yields
    /// no records.
    pub async fn read_records(&mut self) -> Result<Vec<Record>> {
        let Some(format) = Format::detect(&mut self.reader).await? else {
            warn!(input = %self.name, "empty input");
            return Ok(Vec::new());
        };
        let records = format
            .decode(&mut self.reader)
            .await
            .wrap_err_with(|| format!("decoding {}", self.name))?;
        debug!(input = %self.name, ?format, records = records.len(), "decoded");
        Ok(records)
    }
}

pub struct Output {
    writer: BufWriter<Box<dyn AsyncWrite + Unpin + Send>>,
}

impl Output {
    pub async fn from_filename(name: &str) -> Result<Self> {
        let writer: Box<dyn AsyncWrite + Unpin + Send> = match name {
            "stdout" => Box::new(tokio::io::stdout()),
            _ => Box::new(
                File::create(name)
                    .await
                    .wrap_err_with(|| format!("creating {}", name))?,
            ),
        };
        Ok(Output {
            writer: BufWriter::new(writer),
        })
    }

    pub async fn write(&mut self, format: Format, rows: &[Row<'_>]) -> Result<()> {
        format.encode(&mut self.writer, rows).await
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.writer.write_all(buf).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Input names, defaulting to stdin.
pub fn sources(files: &[String]) -> Vec<String> {
    if files.is_empty() {
        vec!["stdin".to_string()]
    } else {
        files.to_vec()
    }
}

/// Concatenates the records of every source into one series.
pub async fn read_series(files: &[String]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for source in sources(files) {
        let mut input = Input::from_filename(&source).await?;
        records.extend(input.read_records().await?);
    }
    Ok(records)
}

/// Reads each source as its own labeled series. `labels` override the file
/// stems in order.
pub async fn read_labeled(files: &[String], labels: &[String]) -> Result<Vec<LabeledSeries<Record>>> {
    let sources = sources(files);
    if labels.len() > sources.len() {
        eyre::bail!("{} labels given for {} inputs", labels.len(), sources.len());
    }
    let mut set = Vec::with_capacity(sources.len());
    for (i, source) in sources.iter().enumerate() {
        let mut input = Input::from_filename(source).await?;
        let label = labels.get(i).cloned().unwrap_or_else(|| input.label());
        set.push(LabeledSeries::new(label, input.read_records().await?));
    }
    Ok(set)
}

/// Loads sampler settings from a JSON file, or the defaults.
pub async fn load_config(path: Option<&str>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("reading config {}", path))?;
    let config = serde_json::from_slice(&raw).wrap_err_with(|| format!("parsing config {}", path))?;
    debug!(path, ?config, "loaded config");
    Ok(config)
}
