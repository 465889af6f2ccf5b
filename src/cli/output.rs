// Output formatting: CSV tables for export, aligned text tables for the terminal

use chrono::{DateTime, Utc};
use std::io::{IsTerminal, Write};

use crate::cycle::display_value;
use crate::flow::{AgeingItem, CfdTable, NetFlowWeek, ThroughputSeries, WipWeek};
use crate::forecast::BurnupForecast;
use crate::models::CycleRecord;
use crate::stats::{Histogram, Percentile, ScatterPoint};
use crate::utils::duration::{as_days_f64, format_duration};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// A header row plus data rows, all as display strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format timestamp for export (UTC)
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Quote a CSV field when it contains a delimiter, quote or newline
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn write_csv<W: Write>(writer: &mut W, table: &Table) -> std::io::Result<()> {
    let line = |cells: &[String]| cells.iter().map(|c| csv_escape(c)).collect::<Vec<_>>().join(",");
    writeln!(writer, "{}", line(&table.headers))?;
    for row in &table.rows {
        writeln!(writer, "{}", line(row))?;
    }
    Ok(())
}

/// Left-aligned text table with a bold header on terminals
pub fn format_table(table: &Table, is_tty: bool) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let pad = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&bold_if_tty(&pad(&table.headers), is_tty));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&pad(row));
        out.push('\n');
    }
    out
}

/// Record table: ID, Link, Name, steps…, Type, Status, Resolution,
/// attributes…, Cycle Time (days), Completed
pub fn records_table(records: &[CycleRecord], step_names: &[&str], attributes: &[&str]) -> Table {
    let mut headers: Vec<String> = vec!["ID".into(), "Link".into(), "Name".into()];
    headers.extend(step_names.iter().map(|s| s.to_string()));
    headers.extend(["Type".to_string(), "Status".to_string(), "Resolution".to_string()]);
    headers.extend(attributes.iter().map(|a| a.to_string()));
    headers.extend(["Cycle Time (days)".to_string(), "Completed".to_string()]);

    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![
                r.key.clone(),
                r.url.clone().unwrap_or_default(),
                r.summary.clone().unwrap_or_default(),
            ];
            row.extend(step_names.iter().map(|name| format_timestamp(r.step(name))));
            row.push(r.issue_type.clone().unwrap_or_default());
            row.push(r.status.clone());
            row.push(r.resolution.clone().unwrap_or_default());
            row.extend(attributes.iter().map(|a| {
                r.fields.get(*a).map(display_value).unwrap_or_default()
            }));
            row.push(r.cycle_time.map(|d| format!("{:.2}", as_days_f64(d))).unwrap_or_default());
            row.push(format_timestamp(r.completed_timestamp));
            row
        })
        .collect();

    Table { headers, rows }
}

pub fn cfd_table(cfd: &CfdTable) -> Table {
    let mut headers = vec!["Date".to_string()];
    headers.extend(cfd.columns.iter().cloned());
    let rows = cfd
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.date.to_string()];
            cells.extend(row.counts.iter().map(|c| c.to_string()));
            cells
        })
        .collect();
    Table { headers, rows }
}

pub fn percentiles_table(percentiles: &[Percentile<chrono::Duration>]) -> Table {
    let mut table = Table::new(&["Percentile", "Cycle Time (days)", "Cycle Time"]);
    for p in percentiles {
        table.rows.push(vec![
            format!("{:.0}%", p.quantile * 100.0),
            format!("{:.2}", as_days_f64(p.value)),
            format_duration(p.value),
        ]);
    }
    table
}

pub fn histogram_table(histogram: &Histogram) -> Table {
    let mut table = Table::new(&["Cycle Time (days)", "Items"]);
    for (label, count) in histogram.labels().into_iter().zip(&histogram.counts) {
        table.rows.push(vec![label, count.to_string()]);
    }
    table
}

pub fn throughput_table(series: &ThroughputSeries) -> Table {
    let mut table = Table::new(&["Period", "Count"]);
    for p in &series.periods {
        table.rows.push(vec![p.start.to_string(), p.count.to_string()]);
    }
    table
}

pub fn scatter_table(points: &[ScatterPoint]) -> Table {
    let mut table = Table::new(&["Completed", "Cycle Time (days)", "ID", "Name"]);
    for p in points {
        table.rows.push(vec![
            p.completed_date.to_string(),
            p.cycle_time_days.to_string(),
            p.key.clone(),
            p.summary.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn ageing_table(items: &[AgeingItem]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Status", "Age (days)"]);
    for item in items {
        table.rows.push(vec![
            item.key.clone(),
            item.summary.clone().unwrap_or_default(),
            item.status.clone(),
            item.age_days.to_string(),
        ]);
    }
    table
}

pub fn net_flow_table(weeks: &[NetFlowWeek]) -> Table {
    let opt = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
    let mut table = Table::new(&["Week", "Arrivals", "Departures", "Net Flow"]);
    for w in weeks {
        table.rows.push(vec![
            w.week_start.to_string(),
            opt(w.arrivals),
            opt(w.departures),
            opt(w.net_flow),
        ]);
    }
    table
}

pub fn wip_table(weeks: &[WipWeek]) -> Table {
    let mut table = Table::new(&["Week", "Min", "Median", "Mean", "Max"]);
    for w in weeks {
        table.rows.push(vec![
            w.week_start.to_string(),
            w.min.to_string(),
            format!("{:.1}", w.median),
            format!("{:.1}", w.mean),
            w.max.to_string(),
        ]);
    }
    table
}

pub fn forecast_table(forecast: &BurnupForecast) -> Table {
    let mut table = Table::new(&["Percentile", "Finish Date"]);
    for p in &forecast.finish_dates {
        table.rows.push(vec![format!("{:.0}%", p.quantile * 100.0), p.value.to_string()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_csv() {
        let mut table = Table::new(&["ID", "Name"]);
        table.rows.push(vec!["A-1".to_string(), "Fix, then ship".to_string()]);
        let mut out = Vec::new();
        write_csv(&mut out, &table).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ID,Name\nA-1,\"Fix, then ship\"\n");
    }

    #[test]
    fn test_records_table_columns() {
        let mut record = CycleRecord::new("A-1", &["todo", "done"]);
        record.status = "Done".to_string();
        record.steps[1].timestamp = Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap());
        record.cycle_time = Some(Duration::hours(36));
        record.fields.insert("Team".to_string(), serde_json::json!("Core"));

        let table = records_table(&[record], &["todo", "done"], &["Team"]);
        assert_eq!(
            table.headers,
            vec!["ID", "Link", "Name", "todo", "done", "Type", "Status", "Resolution", "Team", "Cycle Time (days)", "Completed"]
        );
        let row = &table.rows[0];
        assert_eq!(row[3], "");
        assert_eq!(row[4], "2024-01-05 08:30:00");
        assert_eq!(row[6], "Done");
        assert_eq!(row[8], "Core");
        assert_eq!(row[9], "1.50");
    }

    #[test]
    fn test_format_table_alignment() {
        let mut table = Table::new(&["Week", "Net"]);
        table.rows.push(vec!["2024-05-06".to_string(), "-1".to_string()]);
        let text = format_table(&table, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Week        Net");
        assert_eq!(lines[1], "----------  ---");
        assert_eq!(lines[2], "2024-05-06  -1");
    }

    #[test]
    fn test_wip_table_rounds_mean() {
        let week = WipWeek {
            week_start: chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            min: 0,
            max: 3,
            mean: 12.0 / 7.0,
            median: 2.0,
        };
        let table = wip_table(&[week]);
        assert_eq!(table.headers, vec!["Week", "Min", "Median", "Mean", "Max"]);
        assert_eq!(table.rows[0], vec!["2024-05-06", "0", "2.0", "1.7", "3"]);
    }
}
