use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::dataset::MatchRow;
use crate::metrics::{MetricsTable, TeamCategoryMetrics};

pub struct ExportReport {
    pub matches: usize,
    pub offense_rows: usize,
}

pub fn export_metrics_workbook(
    path: &Path,
    rows: &[MatchRow],
    metrics: &MetricsTable,
) -> Result<ExportReport> {
    let mut match_rows = vec![vec![
        "Date".to_string(),
        "Hour".to_string(),
        "Category".to_string(),
        "Team 1".to_string(),
        "Team 2".to_string(),
        "Possession Team 1 (%)".to_string(),
        "Possession Team 2 (%)".to_string(),
        "Possession In Contest (%)".to_string(),
        "Goals Team 1".to_string(),
        "Goals Team 2".to_string(),
        "Attempts Team 1".to_string(),
        "Attempts Team 2".to_string(),
        "On Target Team 1".to_string(),
        "On Target Team 2".to_string(),
        "Assists Team 1".to_string(),
        "Assists Team 2".to_string(),
    ]];
    match_rows.extend(rows.iter().map(match_row));

    let mut offense_rows = vec![vec![
        "Category".to_string(),
        "Team".to_string(),
        "Total Attempts".to_string(),
        "On-Target %".to_string(),
        "Goals".to_string(),
        "Assists".to_string(),
    ]];
    offense_rows.extend(metrics.records().map(offense_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &match_rows, 5)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Offense")?;
        write_rows(sheet, &offense_rows, 2)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    let report = ExportReport {
        matches: match_rows.len().saturating_sub(1),
        offense_rows: offense_rows.len().saturating_sub(1),
    };
    info!(
        path = %path.display(),
        matches = report.matches,
        offense_rows = report.offense_rows,
        "exported metrics workbook"
    );
    Ok(report)
}

fn match_row(row: &MatchRow) -> Vec<String> {
    vec![
        row.ts.format("%Y-%m-%d").to_string(),
        row.hour.clone(),
        row.category.clone(),
        row.team1.clone(),
        row.team2.clone(),
        row.possession_team1.to_string(),
        row.possession_team2.to_string(),
        row.possession_in_contest.to_string(),
        row.number_of_goals_team1.to_string(),
        row.number_of_goals_team2.to_string(),
        row.total_attempts_team1.to_string(),
        row.total_attempts_team2.to_string(),
        row.on_target_attempts_team1.to_string(),
        row.on_target_attempts_team2.to_string(),
        row.assists_team1.to_string(),
        row.assists_team2.to_string(),
    ]
}

fn offense_row(m: &TeamCategoryMetrics) -> Vec<String> {
    vec![
        m.category.clone(),
        m.team.clone(),
        format!("{:.2}", m.total_attempts),
        format!("{:.2}", m.on_target_pct),
        format!("{:.2}", m.goals),
        format!("{:.2}", m.assists),
    ]
}

// Columns from `numeric_from` onwards are written as numbers when they parse.
fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>], numeric_from: usize) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let result = match value.parse::<f64>() {
                Ok(n) if row_idx > 0 && col_idx >= numeric_from => {
                    worksheet.write_number(row_idx as u32, col_idx as u16, n)
                }
                _ => worksheet.write_string(row_idx as u32, col_idx as u16, value),
            };
            result.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
