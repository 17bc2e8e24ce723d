//! Comparison tables over merged result documents
//!
//! Records from any number of runs (and languages) are grouped by benchmark
//! kind, ordered by language then backend, and laid out with one column per
//! sweep parameter seen in that group.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, Table};
use std::collections::BTreeMap;

use crate::record::{BenchmarkKind, BenchmarkRecord};

/// Records of one benchmark kind, in display order
fn grouped(records: &[BenchmarkRecord]) -> BTreeMap<BenchmarkKind, Vec<&BenchmarkRecord>> {
    let mut groups: BTreeMap<BenchmarkKind, Vec<&BenchmarkRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.benchmark).or_default().push(r);
    }
    for group in groups.values_mut() {
        // Stable, so grid order survives within a (language, backend) pair
        group.sort_by(|a, b| (&a.language, &a.backend).cmp(&(&b.language, &b.backend)));
    }
    groups
}

/// Parameter names in first-seen order
fn parameter_columns(group: &[&BenchmarkRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for r in group {
        for (name, _) in r.parameters.iter() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

fn build_table(group: &[&BenchmarkRecord]) -> Table {
    let params = parameter_columns(group);

    let mut header = vec!["language".to_string(), "backend".to_string()];
    header.extend(params.iter().cloned());
    header.extend(["mean (ms)", "stddev (ms)", "iterations"].map(String::from));

    let mut table = Table::new();
    table.set_header(header);

    for r in group {
        let mut row = vec![Cell::new(&r.language), Cell::new(&r.backend)];
        row.extend(params.iter().map(|p| {
            Cell::new(
                r.parameters
                    .get(p)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            )
        }));
        row.push(Cell::new(format!("{:.3}", r.stats.mean)).set_alignment(CellAlignment::Right));
        row.push(Cell::new(format!("{:.3}", r.stats.stddev)).set_alignment(CellAlignment::Right));
        row.push(Cell::new(r.stats.iterations).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }

    table
}

fn title(kind: BenchmarkKind) -> &'static str {
    match kind {
        BenchmarkKind::Insert => "Insert",
        BenchmarkKind::Search => "Search",
    }
}

/// Render a Markdown document with one table per benchmark kind
pub fn markdown(records: &[BenchmarkRecord]) -> String {
    let mut out = String::new();

    for (kind, group) in grouped(records) {
        let mut table = build_table(&group);
        table.load_preset(ASCII_MARKDOWN);

        out.push_str(&format!("### {} Benchmark\n\n", title(kind)));
        out.push_str(&table.to_string());
        out.push_str("\n\n");
    }

    out
}

/// Render boxed terminal tables, one per benchmark kind
pub fn terminal(records: &[BenchmarkRecord]) -> String {
    let mut out = String::new();

    for (kind, group) in grouped(records) {
        let mut table = build_table(&group);
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);

        out.push_str(&format!("━━━ {} ━━━\n", kind));
        out.push_str(&table.to_string());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridPoint, ParamValue, NGRAM_SIZE, THRESHOLD};
    use crate::stats::Stats;

    fn rec(language: &str, kind: BenchmarkKind, params: &[(&str, ParamValue)], mean: f64) -> BenchmarkRecord {
        BenchmarkRecord {
            language: language.to_string(),
            backend: format!("{}-backend", language),
            benchmark: kind,
            parameters: GridPoint::new(
                params.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            ),
            stats: Stats {
                mean,
                stddev: 0.5,
                iterations: 100,
            },
        }
    }

    fn int(v: i64) -> ParamValue {
        ParamValue::Integer(v)
    }

    fn float(v: f64) -> ParamValue {
        ParamValue::Float(v)
    }

    fn merged() -> Vec<BenchmarkRecord> {
        vec![
            rec("rust", BenchmarkKind::Search, &[(NGRAM_SIZE, int(2)), (THRESHOLD, float(0.6))], 1.0),
            rec("rust", BenchmarkKind::Insert, &[(NGRAM_SIZE, int(2))], 10.0),
            rec("python", BenchmarkKind::Insert, &[(NGRAM_SIZE, int(2))], 55.25),
            rec("python", BenchmarkKind::Insert, &[(NGRAM_SIZE, int(3))], 60.0),
        ]
    }

    #[test]
    fn test_grouping_and_order() {
        let records = merged();
        let groups = grouped(&records);
        let kinds: Vec<_> = groups.keys().copied().collect();
        assert_eq!(kinds, vec![BenchmarkKind::Insert, BenchmarkKind::Search]);

        let insert = &groups[&BenchmarkKind::Insert];
        let languages: Vec<&str> = insert.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(languages, vec!["python", "python", "rust"]);
        // Grid order kept within one language
        assert_eq!(insert[0].parameters.get(NGRAM_SIZE), Some(ParamValue::Integer(2)));
        assert_eq!(insert[1].parameters.get(NGRAM_SIZE), Some(ParamValue::Integer(3)));
    }

    #[test]
    fn test_parameter_columns_per_group() {
        let records = merged();
        let groups = grouped(&records);
        assert_eq!(parameter_columns(&groups[&BenchmarkKind::Insert]), vec![NGRAM_SIZE]);
        assert_eq!(
            parameter_columns(&groups[&BenchmarkKind::Search]),
            vec![NGRAM_SIZE, THRESHOLD]
        );
    }

    #[test]
    fn test_markdown_layout() {
        let md = markdown(&merged());

        let insert_at = md.find("### Insert Benchmark").unwrap();
        let search_at = md.find("### Search Benchmark").unwrap();
        assert!(insert_at < search_at);

        assert!(md.contains("python-backend"));
        assert!(md.contains("55.250"));
        assert!(md.contains("threshold"));
        // Header, separator and three rows for insert
        let insert_section = &md[insert_at..search_at];
        assert_eq!(insert_section.lines().filter(|l| l.starts_with('|')).count(), 5);
    }

    #[test]
    fn test_terminal_tables() {
        let out = terminal(&merged());
        assert!(out.contains("━━━ insert ━━━"));
        assert!(out.contains("━━━ search ━━━"));
        assert!(out.contains("rust-backend"));
    }

    #[test]
    fn test_empty_input() {
        assert!(markdown(&[]).is_empty());
        assert!(terminal(&[]).is_empty());
    }
}
