use std::fmt::Write;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::{ProfilerError, ProfilerResult};
use super::report::TimerReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ProfilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(ProfilerError::config_error(
                "output format",
                format!("unknown format '{}', expected 'table' or 'json'", other),
            )),
        }
    }
}

/// Renders a `TimerReport` for humans or machines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, report: &TimerReport) -> ProfilerResult<String> {
        match self.format {
            OutputFormat::Table => Ok(self.render_table(report)),
            OutputFormat::Json => report.to_json(),
        }
    }

    fn render_table(&self, report: &TimerReport) -> String {
        let width = report
            .iter()
            .map(|(name, _)| name.len())
            .chain(std::iter::once("Timer".len()))
            .max()
            .unwrap_or(0);
        let total = report.total_duration();

        let mut table = String::new();
        let _ = writeln!(table, "{:<width$}  {:>7}  {:>10}  {:>6}", "Timer", "Count", "Seconds", "Share");
        let mut calls = 0;
        for (name, snapshot) in report.iter() {
            let share = if total > 0.0 { snapshot.duration / total * 100.0 } else { 0.0 };
            calls += snapshot.count;
            let _ = writeln!(
                table,
                "{:<width$}  {:>7}  {:>10.3}  {:>5.1}%",
                name, snapshot.count, snapshot.duration, share
            );
        }
        let _ = writeln!(table, "{:<width$}  {:>7}  {:>10.3}", "Total", calls, total);
        table
    }
}
