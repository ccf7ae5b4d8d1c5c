//! Writing check results as a text or JSON report

use crate::proxy::models::{Anonymity, ProbeResult};
use crate::Result;
use anyhow::Context;
use clap::ValueEnum;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for saved reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Labeled block per proxy
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Write one labeled block per result
pub fn write_text<W: Write>(results: &[ProbeResult], mut writer: W) -> Result<()> {
    for result in results {
        writeln!(writer, "Protocol: {}", result.protocol)?;
        writeln!(writer, "Proxy: {}", result.endpoint_raw)?;
        writeln!(writer, "Status: {}", result.status)?;
        writeln!(writer, "IP: {}", or_na(result.observed_ip.as_deref()))?;
        writeln!(writer, "Anon: {}", or_na(result.anonymity))?;
        writeln!(writer, "Server: {}", or_na(result.server_software))?;
        writeln!(writer, "Country: {}", result.country_code)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(results: &[ProbeResult], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Save results to a file in the given format
pub fn save_report<P: AsRef<Path>>(
    results: &[ProbeResult],
    path: P,
    format: ReportFormat,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let writer = BufWriter::new(file);

    match format {
        ReportFormat::Text => write_text(results, writer),
        ReportFormat::Json => write_json(results, writer),
    }
}

/// Order results by protocol, then by the submitted line
pub fn sort_results(results: &mut [ProbeResult]) {
    results.sort_by(|a, b| (a.protocol, &a.endpoint_raw).cmp(&(b.protocol, &b.endpoint_raw)));
}

/// Totals over a finished (or interrupted) check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub total: usize,
    pub working: usize,
    pub not_working: usize,
    pub transparent: usize,
    pub anonymous: usize,
    pub elite: usize,
}

impl CheckSummary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result);
        }
        summary
    }

    pub fn record(&mut self, result: &ProbeResult) {
        self.total += 1;
        if !result.is_working() {
            self.not_working += 1;
            return;
        }

        self.working += 1;
        match result.anonymity {
            Some(Anonymity::Transparent) => self.transparent += 1,
            Some(Anonymity::Anonymous) => self.anonymous += 1,
            Some(Anonymity::Elite) => self.elite += 1,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::error::FailureCause;
    use crate::proxy::models::{Endpoint, Protocol, ServerSoftware};

    fn sample() -> Vec<ProbeResult> {
        let elite = Endpoint::new("1.2.3.4".into(), "8080".into(), "US".into(), Protocol::Socks5);
        let dead = Endpoint::new("5.6.7.8".into(), "3128".into(), "DE".into(), Protocol::Http);
        vec![
            ProbeResult::working(
                &elite,
                "1.2.3.4:8080:US".into(),
                Some("1.2.3.4".into()),
                Anonymity::Elite,
                Some(ServerSoftware::HAProxy),
                42,
            ),
            ProbeResult::not_working(
                &dead,
                "5.6.7.8:3128:DE".into(),
                "127.0.0.1".into(),
                FailureCause::Timeout,
            ),
            ProbeResult::malformed(Protocol::Http, "junk".into()),
        ]
    }

    #[test]
    fn test_text_report_blocks() {
        let mut out = Vec::new();
        write_text(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected_first = "Protocol: socks5\nProxy: 1.2.3.4:8080:US\nStatus: Working\n\
IP: 1.2.3.4\nAnon: elite\nServer: haproxy\nCountry: US\n\n";
        assert!(text.starts_with(expected_first));
        assert!(text.contains(
            "Proxy: 5.6.7.8:3128:DE\nStatus: NotWorking\nIP: 127.0.0.1\nAnon: N/A\nServer: N/A\nCountry: DE\n"
        ));
        assert!(text.contains("Proxy: junk\nStatus: NotWorking\nIP: N/A\nAnon: N/A\nServer: N/A\nCountry: \n"));
        assert_eq!(text.matches("Protocol: ").count(), 3);
    }

    #[test]
    fn test_json_report_reads_back() {
        let results = sample();
        let mut out = Vec::new();
        write_json(&results, &mut out).unwrap();

        let parsed: Vec<ProbeResult> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_sort_results() {
        let mut results = sample();
        sort_results(&mut results);
        let order: Vec<_> = results.iter().map(|r| r.endpoint_raw.as_str()).collect();
        assert_eq!(order, vec!["5.6.7.8:3128:DE", "junk", "1.2.3.4:8080:US"]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = CheckSummary::from_results(&sample());
        assert_eq!(
            summary,
            CheckSummary {
                total: 3,
                working: 1,
                not_working: 2,
                transparent: 0,
                anonymous: 0,
                elite: 1,
            }
        );
    }

    #[test]
    fn test_save_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.md");
        save_report(&sample(), &path, ReportFormat::Text).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Status: Working"));
    }
}
