use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use downsample::Sample;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _};
use tracing::warn;

// Timestamp is either epoch millis or an ISO-8601 string. Millis sort first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    fn parse(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(ms) => Timestamp::Millis(ms),
            Err(_) => Timestamp::Text(s.trim().to_string()),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{}", ms),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}

pub type Record = Sample<Timestamp>;

/// Sample encodings understood on input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => eyre::bail!("unknown encoding: {}", other),
        }
    }

    /// Peeks at the first byte: `{` is JSON lines, anything else CSV.
    /// Returns `None` for empty input.
    pub async fn detect<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Self>> {
        let buf = reader.fill_buf().await?;
        Ok(match buf.first() {
            None => None,
            Some(b'{') => Some(Format::Json),
            Some(_) => Some(Format::Csv),
        })
    }

    pub async fn decode<R: AsyncBufRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<Record>> {
        match self {
            Format::Json => JsonCodec.decode(reader).await,
            Format::Csv => CsvCodec.decode(reader).await,
        }
    }

    pub async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, rows: &[Row<'_>]) -> Result<()> {
        match self {
            Format::Json => JsonCodec.encode(writer, rows).await,
            Format::Csv => CsvCodec.encode(writer, rows).await,
        }
    }
}

#[async_trait]
pub trait Codec {
    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, rows: &[Row<'_>]) -> Result<()>;

    /// Reads every record until EOF.
    async fn decode<R: AsyncBufRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<Record>>;
}

/// A record on its way out, tagged with its series label in multi-series output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Row<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    #[serde(flatten)]
    pub record: &'a Record,
}

impl<'a> Row<'a> {
    pub fn unlabeled(records: &[&'a Record]) -> Vec<Row<'a>> {
        records.iter().map(|&record| Row { label: None, record }).collect()
    }

    pub fn labeled<'b>(label: &'a str, records: &'b [&'a Record]) -> impl Iterator<Item = Row<'a>> + 'b
    where
        'a: 'b,
    {
        records.iter().map(move |&record| Row {
            label: Some(label),
            record,
        })
    }
}

// JsonCodec reads and writes one JSON object per line.
pub struct JsonCodec;

// A decoded line. The `label` written by multi-series output is not a field.
#[derive(Deserialize)]
struct JsonLine {
    #[serde(default, rename = "label")]
    _label: Option<String>,
    #[serde(flatten)]
    record: Record,
}

#[async_trait]
impl Codec for JsonCodec {
    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, rows: &[Row<'_>]) -> Result<()> {
        let mut buf = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buf, row)?;
            buf.push(b'\n');
        }
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn decode<R: AsyncBufRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut lines = reader.lines();
        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let decoded: JsonLine = serde_json::from_str(&line)
                .wrap_err_with(|| format!("decoding JSON sample on line {}", line_no))?;
            records.push(decoded.record);
        }
        Ok(records)
    }
}

// CsvCodec reads and writes a header of `timestamp,<field>,...`.
// Empty cells are nulls.
pub struct CsvCodec;

#[async_trait]
impl Codec for CsvCodec {
    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, rows: &[Row<'_>]) -> Result<()> {
        let fields: BTreeSet<&str> = rows
            .iter()
            .flat_map(|r| r.record.fields.keys().map(String::as_str))
            .collect();
        let labeled = rows.iter().any(|r| r.label.is_some());

        let mut wtr = csv::Writer::from_writer(Vec::new());
        let mut header: Vec<&str> = Vec::with_capacity(fields.len() + 2);
        if labeled {
            header.push("label");
        }
        header.push("timestamp");
        header.extend(fields.iter().copied());
        wtr.write_record(&header)?;

        for row in rows {
            let mut cells: Vec<String> = Vec::with_capacity(header.len());
            if labeled {
                cells.push(row.label.unwrap_or_default().to_string());
            }
            cells.push(row.record.timestamp.to_string());
            for field in &fields {
                cells.push(match row.record.fields.get(*field).copied().flatten() {
                    Some(v) => v.to_string(),
                    None => String::new(),
                });
            }
            wtr.write_record(&cells)?;
        }

        let buf = wtr.into_inner().map_err(|e| eyre::eyre!(e.to_string()))?;
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn decode<R: AsyncBufRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<Record>> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers()?.clone();
        let ts_col = headers
            .iter()
            .position(|h| h == "timestamp")
            .ok_or_else(|| eyre::eyre!("CSV header has no timestamp column"))?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let row_no = row + 2;
            let row = result.wrap_err_with(|| format!("reading CSV row {}", row_no))?;
            let mut record = Sample::new(Timestamp::parse(&row[ts_col]));
            for (col, (name, cell)) in headers.iter().zip(row.iter()).enumerate() {
                if col == ts_col || name == "label" {
                    continue;
                }
                record.fields.insert(name.to_string(), parse_cell(cell, name, row_no));
            }
            records.push(record);
        }
        Ok(records)
    }
}

fn parse_cell(cell: &str, column: &str, row: usize) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(row, column, cell, "non-numeric value read as null");
            None
        }
    }
}
