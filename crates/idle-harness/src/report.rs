// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Writing duration summaries as they are produced.
//!
//! Three formats:
//!
//! - `text`: one human-readable line per bucket,
//!   `iters:   10, pause:   200 ms, avg decode time:    50.00 +/- 0.00 ms`
//! - `json`: one JSON object per line
//! - `csv`: a header row, then one row per bucket (via the `csv` crate)
//!
//! Every record is flushed immediately so a consumer sees each bucket before
//! the next one starts, and an aborted sweep still leaves complete output.

use crate::{DurationSummary, HarnessError};
use device_monitor::DeviceSnapshot;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output format for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(HarnessError::ConfigError(format!(
                "unknown output format '{other}'; expected 'text', 'json', or 'csv'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

/// The classic one-line rendering of a summary.
pub fn format_text(summary: &DurationSummary) -> String {
    format!(
        "iters: {:4}, pause: {:5} ms, avg decode time: {:8.2} +/- {:4.2} ms",
        summary.stats.count,
        summary.idle_ms(),
        summary.stats.mean_ms(),
        summary.stats.stddev_ms(),
    )
}

#[derive(serde::Serialize)]
struct Record<'a> {
    idle_ms: f64,
    count: usize,
    mean_ms: f64,
    stddev_ms: f64,
    dispersion_defined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a DeviceSnapshot>,
}

impl<'a> Record<'a> {
    fn new(summary: &DurationSummary, device: Option<&'a DeviceSnapshot>) -> Self {
        Self {
            idle_ms: summary.idle.as_secs_f64() * 1000.0,
            count: summary.stats.count,
            mean_ms: summary.stats.mean_ms(),
            stddev_ms: summary.stats.stddev_ms(),
            dispersion_defined: summary.stats.dispersion_defined(),
            device,
        }
    }
}

/// One CSV row without device columns.
#[derive(serde::Serialize)]
struct CsvRow {
    idle_ms: f64,
    count: usize,
    mean_ms: f64,
    stddev_ms: f64,
}

/// One CSV row with device columns; missing readings stay empty.
#[derive(serde::Serialize)]
struct CsvDeviceRow {
    idle_ms: f64,
    count: usize,
    mean_ms: f64,
    stddev_ms: f64,
    cpu_mhz: Option<u32>,
    cpu_max_mhz: Option<u32>,
    temp_c: Option<f32>,
}

const CSV_HEADER: [&str; 4] = ["idle_ms", "count", "mean_ms", "stddev_ms"];
const CSV_DEVICE_HEADER: [&str; 3] = ["cpu_mhz", "cpu_max_mhz", "temp_c"];

enum Sink<W: Write> {
    Plain(W),
    Csv(csv::Writer<W>),
}

/// Streams summaries to `out` in one [`OutputFormat`].
pub struct SummaryWriter<W: Write> {
    sink: Sink<W>,
    format: OutputFormat,
    device_columns: bool,
    header_written: bool,
    records: usize,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        let sink = match format {
            OutputFormat::Csv => Sink::Csv(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(out),
            ),
            OutputFormat::Text | OutputFormat::Json => Sink::Plain(out),
        };
        Self {
            sink,
            format,
            device_columns: false,
            header_written: false,
            records: 0,
        }
    }

    /// Adds CPU clock and temperature columns to CSV output. Text and JSON
    /// include the device whenever one is passed to [`SummaryWriter::write`].
    pub fn with_device_columns(mut self, enabled: bool) -> Self {
        self.device_columns = enabled;
        self
    }

    /// Writes one summary and flushes.
    pub fn write(
        &mut self,
        summary: &DurationSummary,
        device: Option<&DeviceSnapshot>,
    ) -> Result<(), HarnessError> {
        match &mut self.sink {
            Sink::Plain(out) => {
                match self.format {
                    OutputFormat::Json => {
                        serde_json::to_writer(&mut *out, &Record::new(summary, device))
                            .map_err(std::io::Error::from)?;
                        writeln!(out)?;
                    }
                    _ => {
                        let line = format_text(summary);
                        match device {
                            Some(d) => writeln!(out, "{line}  [{}]", d.summary())?,
                            None => writeln!(out, "{line}")?,
                        }
                    }
                }
                out.flush()?;
            }
            Sink::Csv(wtr) => {
                write_csv(wtr, &mut self.header_written, self.device_columns, summary, device)
                    .map_err(std::io::Error::from)?;
                wtr.flush()?;
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Number of summaries written.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, HarnessError> {
        match self.sink {
            Sink::Plain(out) => Ok(out),
            Sink::Csv(wtr) => wtr.into_inner().map_err(|e| HarnessError::Output(e.into_error())),
        }
    }
}

fn write_csv<W: Write>(
    wtr: &mut csv::Writer<W>,
    header_written: &mut bool,
    device_columns: bool,
    summary: &DurationSummary,
    device: Option<&DeviceSnapshot>,
) -> csv::Result<()> {
    if !*header_written {
        if device_columns {
            wtr.write_record(CSV_HEADER.iter().chain(CSV_DEVICE_HEADER.iter()))?;
        } else {
            wtr.write_record(CSV_HEADER)?;
        }
        *header_written = true;
    }

    let r = Record::new(summary, device);
    if device_columns {
        wtr.serialize(CsvDeviceRow {
            idle_ms: r.idle_ms,
            count: r.count,
            mean_ms: r.mean_ms,
            stddev_ms: r.stddev_ms,
            cpu_mhz: device.map(|d| d.cpu.frequency_mhz),
            cpu_max_mhz: device.map(|d| d.cpu.max_frequency_mhz),
            temp_c: device.and_then(|d| d.thermal.as_ref()).map(|t| t.temp_celsius),
        })
    } else {
        wtr.serialize(CsvRow {
            idle_ms: r.idle_ms,
            count: r.count,
            mean_ms: r.mean_ms,
            stddev_ms: r.stddev_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize;
    use device_monitor::{CpuInfo, ThermalInfo};
    use std::time::Duration;

    fn summary(idle_ms: u64, samples_ms: &[u64]) -> DurationSummary {
        let samples: Vec<_> = samples_ms.iter().map(|&m| Duration::from_millis(m)).collect();
        DurationSummary {
            idle: Duration::from_millis(idle_ms),
            stats: summarize(&samples).unwrap(),
        }
    }

    fn device() -> DeviceSnapshot {
        DeviceSnapshot {
            cpu: CpuInfo {
                frequency_mhz: 1200,
                min_frequency_mhz: 800,
                max_frequency_mhz: 3600,
                governor: Some("powersave".into()),
                online_cores: 8,
            },
            thermal: Some(ThermalInfo { temp_celsius: 54.3 }),
            timestamp_ms: 1,
        }
    }

    fn output(writer: SummaryWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_text_line() {
        assert_eq!(
            format_text(&summary(200, &[10, 20])),
            "iters:    2, pause:   200 ms, avg decode time:    15.00 +/- 7.07 ms"
        );
    }

    #[test]
    fn test_text_with_device() {
        let mut w = SummaryWriter::new(Vec::new(), OutputFormat::Text);
        w.write(&summary(0, &[5]), Some(&device())).unwrap();
        let out = output(w);
        assert!(out.starts_with("iters:    1, pause:     0 ms"));
        assert!(out.contains("[Device: CPU 1200/3600 MHz"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_json_lines() {
        let mut w = SummaryWriter::new(Vec::new(), OutputFormat::Json);
        w.write(&summary(0, &[10, 20]), None).unwrap();
        w.write(&summary(400, &[7]), Some(&device())).unwrap();
        assert_eq!(w.records(), 2);

        let out = output(w);
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["idle_ms"].as_f64(), Some(0.0));
        assert_eq!(lines[0]["count"], 2);
        assert_eq!(lines[0]["mean_ms"].as_f64(), Some(15.0));
        assert!(lines[0].get("device").is_none());
        assert_eq!(lines[1]["idle_ms"].as_f64(), Some(400.0));
        assert_eq!(lines[1]["dispersion_defined"], false);
        assert_eq!(lines[1]["device"]["cpu"]["frequency_mhz"], 1200);
    }

    #[test]
    fn test_csv() {
        let mut w = SummaryWriter::new(Vec::new(), OutputFormat::Csv);
        w.write(&summary(0, &[10, 20]), None).unwrap();
        w.write(&summary(200, &[4, 4]), None).unwrap();
        let out = output(w);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "idle_ms,count,mean_ms,stddev_ms");
        assert!(lines[1].starts_with("0.0,2,15.0,7.07"));
        assert_eq!(lines[2], "200.0,2,4.0,0.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_device_columns() {
        let mut w = SummaryWriter::new(Vec::new(), OutputFormat::Csv).with_device_columns(true);
        w.write(&summary(0, &[1]), Some(&device())).unwrap();
        w.write(&summary(100, &[1]), None).unwrap();
        let out = output(w);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "idle_ms,count,mean_ms,stddev_ms,cpu_mhz,cpu_max_mhz,temp_c");
        assert_eq!(lines[1], "0.0,1,1.0,0.0,1200,3600,54.3");
        assert_eq!(lines[2], "100.0,1,1.0,0.0,,,");
    }

    #[test]
    fn test_csv_rows_flushed_per_record() {
        // Each record is flushed through the csv buffer as it is written.
        let mut buf = Vec::new();
        {
            let mut w = SummaryWriter::new(&mut buf, OutputFormat::Csv);
            w.write(&summary(0, &[3]), None).unwrap();
            assert_eq!(w.records(), 1);
            w.write(&summary(50, &[3]), None).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.lines().count(), 3);
        assert_eq!(out.lines().nth(2), Some("50.0,1,3.0,0.0"));
    }

    #[test]
    fn test_csv_thermal_missing() {
        let mut snapshot = device();
        snapshot.thermal = None;
        let mut w = SummaryWriter::new(Vec::new(), OutputFormat::Csv).with_device_columns(true);
        w.write(&summary(0, &[2]), Some(&snapshot)).unwrap();
        let out = output(w);
        assert_eq!(out.lines().nth(1), Some("0.0,1,2.0,0.0,1200,3600,"));
    }
}
