//! テキストレポートの整形
//!
//! 生ログのプレビューと集計表を、列幅を揃えた表として文字列にする。

use std::io::Write;

use anyhow::Result;

use crate::aggregator::BatchTotals;
use crate::types::{LogRecord, ServiceSummary};

const COLUMN_GAP: &str = "  ";

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    align: Align,
}

const RECORD_COLUMNS: [Column; 6] = [
    Column { header: "", align: Align::Right },
    Column { header: "service", align: Align::Left },
    Column { header: "timestamp", align: Align::Left },
    Column { header: "status_code", align: Align::Right },
    Column { header: "latency_ms", align: Align::Right },
    Column { header: "is_error", align: Align::Right },
];

const SUMMARY_COLUMNS: [Column; 4] = [
    Column { header: "service", align: Align::Left },
    Column { header: "total_requests", align: Align::Right },
    Column { header: "avg_latency", align: Align::Right },
    Column { header: "error_rate_pct", align: Align::Right },
];

fn format_line<'a>(
    columns: &[Column],
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> String {
    let line = cells
        .zip(columns.iter().zip(widths))
        .map(|(cell, (col, &width))| match col.align {
            Align::Left => format!("{cell:<width$}"),
            Align::Right => format!("{cell:>width$}"),
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format_line(columns, &widths, columns.iter().map(|c| c.header));
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(columns, &widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out
}

/// 先頭 `limit` 件のプレビュー
pub fn render_records(records: &[LogRecord], limit: usize) -> String {
    if records.is_empty() {
        return "(no records)\n".to_string();
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| {
            vec![
                i.to_string(),
                r.service().to_string(),
                r.timestamp_iso(),
                r.status_code().to_string(),
                r.latency_ms().to_string(),
                r.is_error().to_string(),
            ]
        })
        .collect();

    let mut out = render_table(&RECORD_COLUMNS, &rows);
    let rest = records.len().saturating_sub(limit);
    if rest > 0 {
        out.push_str(&format!("... {rest} more rows\n"));
    }
    out
}

pub fn render_summaries(summaries: &[ServiceSummary]) -> String {
    if summaries.is_empty() {
        return "(no records)\n".to_string();
    }

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.service.to_string(),
                s.total_requests.to_string(),
                format!("{:.2}", s.avg_latency),
                format!("{:.2}", s.error_rate_pct),
            ]
        })
        .collect();

    render_table(&SUMMARY_COLUMNS, &rows)
}

pub fn render_totals(totals: &BatchTotals) -> String {
    format!(
        "Total: {} requests, {} errors ({:.2}%), avg latency {:.2} ms\n",
        totals.total_requests, totals.error_count, totals.error_rate_pct, totals.avg_latency
    )
}

/// レポート全体を書き出す
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[LogRecord],
    summaries: &[ServiceSummary],
    preview: usize,
) -> Result<()> {
    writeln!(out, "--- Full Logs ---")?;
    write!(out, "{}", render_records(records, preview))?;
    writeln!(out, "--- Aggregated Metrics ---")?;
    write!(out, "{}", render_summaries(summaries))?;
    write!(out, "{}", render_totals(&BatchTotals::from_records(records)))?;
    out.flush()?;
    Ok(())
}
