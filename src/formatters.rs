use crate::constants::MAX_TEXT_ROWS;
use crate::models::VariableGroup;
use crate::table::Table;

/// Formats an observation table as aligned, human-readable text
pub fn format_table(table: &Table) -> String {
    if table.is_empty() {
        return format!(
            "No observations returned (columns: {}).",
            table.columns().join(", ")
        );
    }

    let shown: Vec<_> = table.rows().take(MAX_TEXT_ROWS).collect();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            shown
                .iter()
                .map(|row| row.values()[i].len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut output = format!(
        "KNMI Observations ({} rows, indexed by {})\n\n",
        table.len(),
        table.index_column()
    );
    push_line(&mut output, table.columns().iter().map(String::as_str), &widths);
    for row in &shown {
        push_line(&mut output, row.values().iter().map(String::as_str), &widths);
    }

    if table.len() > shown.len() {
        output.push_str(&format!(
            "\n... {} more rows not shown (request format \"json\" for the full table)\n",
            table.len() - shown.len()
        ));
    }
    output
}

fn push_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:>width$}", cell))
        .collect();
    output.push_str(line.join("  ").trim_end());
    output.push('\n');
}

/// Formats an observation table as a JSON array of records
pub fn format_table_json(table: &Table) -> serde_json::Result<String> {
    serde_json::to_string_pretty(table)
}

/// Lists the variable groups accepted by the `vars` parameter
pub fn format_variable_groups() -> String {
    let mut output = String::from("KNMI Variable Groups:\n\n");
    for group in VariableGroup::ALL_GROUPS {
        output.push_str(&format!("{}: {}\n", group.acronym(), group.description()));
        for (code, description) in group.variables() {
            output.push_str(&format!("  {}: {}\n", code, description));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    #[test]
    fn aligns_columns() {
        let table = parse_table("# STN,YYYYMMDD,TG\n240,20190101,85\n240,20190102,-3\n").unwrap();
        let text = format_table(&table);

        assert!(text.starts_with("KNMI Observations (2 rows, indexed by YYYYMMDD)"));
        assert!(text.contains("STN  YYYYMMDD  TG\n"));
        assert!(text.contains("240  20190101  85\n"));
        assert!(text.contains("240  20190102  -3\n"));
        assert!(!text.contains("more rows"));
    }

    #[test]
    fn truncates_long_tables() {
        let mut body = String::from("# STN,YYYYMMDD,TG\n");
        for day in 0..(MAX_TEXT_ROWS + 5) {
            body.push_str(&format!("240,{},10\n", 20190000 + day));
        }
        let table = parse_table(&body).unwrap();

        assert!(format_table(&table).contains("... 5 more rows not shown"));
    }

    #[test]
    fn empty_table_lists_columns() {
        let table = parse_table("# STN,YYYYMMDD,TG\n").unwrap();
        assert_eq!(
            format_table(&table),
            "No observations returned (columns: STN, YYYYMMDD, TG)."
        );
    }

    #[test]
    fn lists_groups() {
        let text = format_variable_groups();
        assert!(text.contains(
            "TEMP: temperature\n  TG: daily mean temperature (0.1 degrees Celsius)\n  TN: "
        ));
        assert!(text.contains("  FHVEC: vector mean wind speed (0.1 m/s)\n"));
        assert!(text.contains("  RHXH: hourly division in which RHX was measured\n"));
        assert!(text.contains("ALL: all variables\n"));
    }
}
