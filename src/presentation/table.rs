// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt::Write;

use crate::domain::models::report::RunReport;

const COLUMNS: [&str; 3] = ["job_title", "location", "count"];

/// 把本次运行的观测值渲染成带边框的表格
///
/// ```text
/// +--------------+----------+-------+
/// |  job_title   | location | count |
/// +--------------+----------+-------+
/// | Ice Sculptor | Honolulu |  19   |
/// +--------------+----------+-------+
/// ```
pub fn render_results(report: &RunReport) -> String {
    let rows: Vec<[String; 3]> = report
        .observations
        .iter()
        .map(|o| [o.job_title.clone(), o.location.clone(), o.count.to_string()])
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .fold(String::from("+"), |mut line, w| {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
            line
        });

    let mut out = String::new();
    let _ = writeln!(out, "{}", border);
    push_row(&mut out, &COLUMNS.map(String::from), &widths);
    let _ = writeln!(out, "{}", border);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(out, "{}", border);
    out
}

fn push_row(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, " {:^width$} |", cell, width = width);
    }
    out.push('\n');
}

/// 失败搜索词的摘要，每行一个
pub fn render_failures(report: &RunReport) -> String {
    report
        .failures
        .iter()
        .map(|f| format!("  {}\n", f))
        .collect()
}
