use crate::analysis::attribution;
use crate::models::record::{Dataset, SkippedRow, TimesheetRecord, ValidationReport};
use crate::models::registry::MappingRegistry;

const RAW_PREVIEW_LEN: usize = 100;
const PARSED_PREVIEW_LEN: usize = 5;

/// Parse a whole CSV document into a dataset plus a validation report.
///
/// The first non-blank line is the header; its de-quoted tokens become the
/// canonical field names and fix the expected column count for every data
/// row. Rows whose column count differs are diagnosed in the report and
/// excluded; the rest of the import proceeds. Pure function, nothing is
/// mutated outside the return value.
pub fn parse_document(text: &str) -> Dataset {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return Dataset::default();
    }

    let headers: Vec<String> = split_line(lines[0])
        .into_iter()
        .map(|token| token.trim_matches('"').trim().to_string())
        .collect();
    let expected_columns = headers.len();

    let mut records = Vec::new();
    let mut skipped_rows = Vec::new();

    let mut i = 1;
    while i < lines.len() {
        let line_start = i;
        let mut logical_line = lines[i].to_string();

        // An odd count of unescaped quotes means a quoted field continues on
        // the next physical line; keep appending until balanced or the input
        // runs out.
        while has_unbalanced_quotes(&logical_line) && i + 1 < lines.len() {
            i += 1;
            logical_line.push('\n');
            logical_line.push_str(lines[i]);
        }

        let values = split_line(&logical_line);
        if values.len() == expected_columns {
            records.push(TimesheetRecord::from_fields(&headers, &values));
        } else {
            skipped_rows.push(skipped_row(
                line_start + 1,
                &logical_line,
                values,
                expected_columns,
            ));
        }

        i += 1;
    }

    let validation = ValidationReport {
        total_lines: lines.len(),
        valid_rows: records.len(),
        invalid_rows: skipped_rows.len(),
        headers: headers.clone(),
        skipped_rows,
    };

    Dataset {
        headers,
        records,
        validation,
    }
}

/// Split one logical CSV line into trimmed fields. A quote toggles quoted
/// mode unless doubled, in which case it is a literal `"`; commas only
/// terminate fields outside quotes.
pub fn split_line(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            if in_quotes && chars.get(i + 1) == Some(&'"') {
                current.push('"');
                i += 1;
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == ',' && !in_quotes {
            values.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
        i += 1;
    }

    values.push(current.trim().to_string());
    values
}

fn has_unbalanced_quotes(line: &str) -> bool {
    let chars: Vec<char> = line.chars().collect();
    let mut unescaped = 0usize;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '"' {
            if chars.get(i + 1) == Some(&'"') {
                i += 1;
            } else {
                unescaped += 1;
            }
        }
        i += 1;
    }
    unescaped % 2 != 0
}

fn skipped_row(
    line_number: usize,
    raw_line: &str,
    values: Vec<String>,
    expected_columns: usize,
) -> SkippedRow {
    let raw_preview = if raw_line.chars().count() > RAW_PREVIEW_LEN {
        let truncated: String = raw_line.chars().take(RAW_PREVIEW_LEN).collect();
        format!("{truncated}...")
    } else {
        raw_line.to_string()
    };

    let actual_columns = values.len();
    let parsed_values = if values.len() > PARSED_PREVIEW_LEN {
        let mut preview: Vec<String> = values.into_iter().take(PARSED_PREVIEW_LEN).collect();
        preview.push("...".to_string());
        preview
    } else {
        values
    };

    SkippedRow {
        line_number,
        raw_line: raw_preview,
        parsed_values,
        expected_columns,
        actual_columns,
        reason: format!(
            "Column count mismatch: expected {expected_columns}, got {actual_columns}"
        ),
    }
}

/// Write records back out as CSV in the dataset's original column order.
///
/// The `_overrides` bookkeeping column is dropped and plain `Team`/`Project`
/// columns are synthesized from resolved attribution (appended if the import
/// did not carry them). Every field is double-quoted with embedded quotes
/// doubled, so embedded commas and newlines survive a round trip.
pub fn export_csv(
    headers: &[String],
    records: &[TimesheetRecord],
    registry: &MappingRegistry,
) -> String {
    let mut columns: Vec<String> = headers
        .iter()
        .filter(|h| h.as_str() != "_overrides")
        .cloned()
        .collect();
    if !columns.iter().any(|h| h == "Team") {
        columns.push("Team".to_string());
    }
    if !columns.iter().any(|h| h == "Project") {
        columns.push("Project".to_string());
    }

    let mut out = String::new();
    out.push_str(
        &columns
            .iter()
            .map(|h| quote_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');

    for record in records {
        let resolved = attribution::resolve_attribution(record, registry);
        let team = resolved.team.unwrap_or_default();
        let project = resolved.project.unwrap_or_default();

        let row: Vec<String> = columns
            .iter()
            .map(|header| match header.as_str() {
                "Team" => quote_field(&team),
                "Project" => quote_field(&project),
                other => quote_field(record.field(other).unwrap_or("")),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_multiline_field_into_one_record() {
        let dataset = parse_document("Name,Note\n\"A\",\"line1\nline2\"");
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(
            dataset.records[0].extra.get("Note").map(String::as_str),
            Some("line1\nline2")
        );
        assert_eq!(dataset.validation.invalid_rows, 0);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let values = split_line("a,\"He said \"\"hi\"\"\"");
        assert_eq!(values, vec!["a".to_string(), "He said \"hi\"".to_string()]);
    }

    #[test]
    fn rejects_rows_with_mismatched_column_counts() {
        let dataset = parse_document("Full name,Hours,Work date\nJane,8\nBob,4,2024-01-02");
        assert_eq!(dataset.validation.valid_rows, 1);
        assert_eq!(dataset.validation.invalid_rows, 1);
        assert_eq!(
            dataset.validation.valid_rows + dataset.validation.invalid_rows,
            dataset.validation.total_lines - 1
        );

        let skipped = &dataset.validation.skipped_rows[0];
        assert_eq!(skipped.line_number, 2);
        assert_eq!(skipped.expected_columns, 3);
        assert_eq!(skipped.actual_columns, 2);
    }

    #[test]
    fn truncates_previews_for_long_rejected_rows() {
        let long_row = format!("{},extra", "x".repeat(200));
        let dataset = parse_document(&format!("A\n{long_row}"));
        let skipped = &dataset.validation.skipped_rows[0];
        assert!(skipped.raw_line.ends_with("..."));
        assert_eq!(skipped.raw_line.chars().count(), RAW_PREVIEW_LEN + 3);
    }

    #[test]
    fn preview_caps_parsed_values_at_five() {
        let dataset = parse_document("A,B\n1,2,3,4,5,6,7");
        let skipped = &dataset.validation.skipped_rows[0];
        assert_eq!(skipped.parsed_values.len(), PARSED_PREVIEW_LEN + 1);
        assert_eq!(skipped.parsed_values.last().map(String::as_str), Some("..."));
    }

    #[test]
    fn drops_the_overrides_bookkeeping_column_on_import() {
        let dataset = parse_document("Full name,_overrides\nJane,{\"team\":\"X\"}");
        assert_eq!(dataset.records.len(), 1);
        assert!(dataset.records[0].extra.is_empty());
        assert!(dataset.records[0].overrides.is_empty());
    }

    #[test]
    fn export_import_round_trips_plain_records() {
        let source = "Full name,Hours,Work date\nJane,8,2024-01-02\nBob,4,2024-01-03";
        let dataset = parse_document(source);
        let registry = MappingRegistry::default();
        let exported = export_csv(&dataset.headers, &dataset.records, &registry);
        let reimported = parse_document(&exported);

        assert_eq!(reimported.records.len(), dataset.records.len());
        for (a, b) in reimported.records.iter().zip(dataset.records.iter()) {
            assert_eq!(a.full_name, b.full_name);
            assert_eq!(a.hours, b.hours);
            assert_eq!(a.work_date, b.work_date);
        }
        // Synthesized attribution columns come back as canonical fields.
        assert!(reimported.headers.iter().any(|h| h == "Team"));
    }
}
