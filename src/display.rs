//! Plain-text rendering of answers for the terminal.

use serde_json::Value;

use crate::core::{DatasetInspection, Response};
use crate::dataset::Dataset;

const NULL_CELL: &str = "-";

/// Status message, table and data source details of a response
pub fn render_response(response: &Response) -> String {
    let mut out = String::new();

    for notice in &response.notices {
        out.push_str(&format!("{}\n", notice));
    }

    let answer = &response.answer;
    if !answer.success {
        out.push_str(&format!("Warning: {}\n", answer.message));
        return out;
    }

    out.push_str(&format!("{}\n", answer.message));
    if let Some(table) = &answer.table {
        out.push('\n');
        out.push_str(&render_table(table));
    }

    if let Some(meta) = &answer.meta {
        out.push_str("\nData Source Details\n");
        out.push_str(&format!("  Source:      {}\n", meta.source));
        out.push_str(&format!("  Dataset URL: {}\n", meta.source_url));
        out.push_str(&format!("  Rows Used:   {}\n", meta.rows_used));
    }

    out
}

/// Column-aligned table with a header rule
pub fn render_table(table: &Dataset) -> String {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!("{}\n", join_padded(table.columns(), &widths)));
    let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&format!("{}\n", "-".repeat(rule)));

    if cells.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in &cells {
        out.push_str(&format!("{}\n", join_padded(row, &widths)));
    }

    out
}

/// Columns, row count and schema check of a dataset
pub fn render_inspection(inspection: &DatasetInspection) -> String {
    let mut out = String::new();

    out.push_str(&format!("Dataset:     {}\n", inspection.kind));
    out.push_str(&format!("Source:      {}\n", inspection.kind.source_label()));
    out.push_str(&format!("Dataset URL: {}\n", inspection.source_url));
    out.push_str(&format!("Rows:        {}\n", inspection.rows));
    out.push_str(&format!("Columns ({}):\n", inspection.columns.len()));
    for column in &inspection.columns {
        out.push_str(&format!("  {}\n", column));
    }

    let report = &inspection.report;
    if report.is_valid() {
        out.push_str("Schema: ok\n");
    } else {
        out.push_str("Schema: drift detected\n");
    }
    for resolved in &report.resolved {
        out.push_str(&format!("  {} -> {}\n", resolved.label, resolved.column));
    }
    for missing in &report.missing {
        out.push_str(&format!("  missing {}\n", missing));
    }

    out
}

fn join_padded<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Floats to two decimals, integers and text as they are
fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => NULL_CELL.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Answer, FailureKind, Intent, SourceMeta};
    use crate::source::DatasetKind;
    use serde_json::json;

    fn response(answer: Answer, notices: Vec<String>) -> Response {
        Response {
            request_id: "q-1-0001".to_string(),
            question: "compare rainfall in punjab and gujarat".to_string(),
            intent: Intent::Rainfall,
            answer,
            notices,
        }
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = Dataset::new(
            vec!["state".to_string(), "rainfall".to_string()],
            vec![
                vec![json!("Gujarat"), json!(50.0)],
                vec![json!("Punjab"), json!(null)],
            ],
        );

        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "state    rainfall");
        assert_eq!(lines[1], "-".repeat(17));
        assert_eq!(lines[2], "Gujarat  50.00");
        assert_eq!(lines[3], "Punjab   -");
    }

    #[test]
    fn test_render_success_includes_source_details() {
        let table = Dataset::new(vec!["msp".to_string()], vec![vec![json!(2275)]]);
        let answer = Answer::success(
            "MSP Data for wheat:",
            table,
            SourceMeta::new(DatasetKind::Msp, "https://api.data.gov.in/resource/msp", 2),
        );

        let rendered = render_response(&response(answer, vec![]));

        assert!(rendered.starts_with("MSP Data for wheat:"));
        assert!(rendered.contains("2275"));
        assert!(rendered.contains("Data Source Details"));
        assert!(rendered.contains("Source:      Department of Agriculture & Farmers Welfare"));
        assert!(rendered.contains("Rows Used:   2"));
    }

    #[test]
    fn test_render_failure_with_notice() {
        let answer = Answer::failure(FailureKind::SchemaDrift, "State column missing in dataset.");
        let rendered = render_response(&response(answer, vec!["Error fetching data: timeout".to_string()]));

        assert!(rendered.starts_with("Error fetching data: timeout\n"));
        assert!(rendered.contains("Warning: State column missing in dataset."));
        assert!(!rendered.contains("Data Source Details"));
    }

    #[test]
    fn test_render_inspection_lists_columns_and_drift() {
        let dataset = Dataset::new(
            vec!["state_name".to_string(), "year".to_string()],
            vec![vec![json!("Goa"), json!("2020")]],
        );
        let inspection = DatasetInspection {
            kind: DatasetKind::Rainfall,
            source_url: "https://api.data.gov.in/resource/rain".to_string(),
            columns: dataset.columns().to_vec(),
            rows: dataset.len(),
            report: DatasetKind::Rainfall.schema().validate(&dataset),
        };

        let rendered = render_inspection(&inspection);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Dataset:     rainfall");
        assert_eq!(lines[3], "Rows:        1");
        assert_eq!(lines[4], "Columns (2):");
        assert_eq!(lines[5], "  state_name");
        assert!(rendered.contains("Schema: drift detected\n"));
        assert!(rendered.contains("  state -> state_name\n"));
        assert!(lines.iter().any(|line| line.starts_with("  missing rainfall")));
        assert!(rendered.ends_with('\n'));
    }
}
