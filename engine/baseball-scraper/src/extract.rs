//! Turning a table element into a [`StatTable`]

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::locator::{parse_selector, TableLocator};
use crate::table::StatTable;

/// Upper bound on a single cell's colspan
const MAX_COLSPAN: usize = 64;

/// How rows are read out of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractStrategy {
    /// Walk the table's own rows, skip hidden rows and repeated headers,
    /// expand colspans
    #[default]
    VisibleRows,
    /// First row is the header, every `tr` below it is data, nested tables
    /// and hidden rows included. Kept for comparison with older output.
    Legacy,
}

/// Everything needed to pull one table off a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub locator: TableLocator,
    pub strategy: ExtractStrategy,
    /// Summary rows to drop from the end (e.g. a league-average line)
    pub drop_trailing: usize,
}

impl TableSpec {
    pub fn new(locator: TableLocator) -> Self {
        Self { locator, strategy: ExtractStrategy::default(), drop_trailing: 0 }
    }

    pub fn with_strategy(mut self, strategy: ExtractStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn dropping_trailing(mut self, count: usize) -> Self {
        self.drop_trailing = count;
        self
    }

    /// Locate and extract the table from a full page
    pub fn extract(&self, html: &str) -> Result<StatTable> {
        let document = Html::parse_document(html);

        let mut table = match self.locator.locate(&document)? {
            Some(element) => extract_rows(element, self.strategy)?,
            None => {
                let not_found = || ScrapeError::TableNotFound(self.locator.to_string());
                let fragment = self.locator.find_in_comments(&document)?.ok_or_else(not_found)?;
                debug!("{} found inside an HTML comment", self.locator);
                let element = self.locator.locate_table(&fragment)?.ok_or_else(not_found)?;
                extract_rows(element, self.strategy)?
            }
        };

        table.drop_trailing(self.drop_trailing);

        if table.is_empty() {
            return Err(ScrapeError::Empty(self.locator.to_string()));
        }
        Ok(table)
    }
}

/// Read a located table element with the given strategy
pub fn extract_rows(table: ElementRef<'_>, strategy: ExtractStrategy) -> Result<StatTable> {
    match strategy {
        ExtractStrategy::VisibleRows => extract_visible_rows(table),
        ExtractStrategy::Legacy => extract_legacy(table),
    }
}

fn extract_visible_rows(table: ElementRef<'_>) -> Result<StatTable> {
    let mut head_rows = Vec::new();
    let mut body_rows = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => head_rows.extend(child_rows(child)),
            "tbody" | "tfoot" => body_rows.extend(child_rows(child)),
            "tr" => body_rows.push(child),
            _ => {}
        }
    }

    head_rows.retain(|row| !is_hidden(*row));
    body_rows.retain(|row| !is_hidden(*row));

    // Without a <thead>, the first visible row names the columns
    let header_row = match head_rows.last() {
        Some(row) => *row,
        None if !body_rows.is_empty() => body_rows.remove(0),
        None => return Err(ScrapeError::parse("table has no rows")),
    };

    let columns = header_names(header_row);
    if columns.is_empty() {
        return Err(ScrapeError::parse("header row has no cells"));
    }

    let mut stats = StatTable::new(columns);
    for row in body_rows {
        if is_repeated_header(row, stats.columns()) {
            continue;
        }

        let values = row_values(row);
        if is_blank(&values) {
            continue;
        }
        stats.push_row(values);
    }

    Ok(stats)
}

fn extract_legacy(table: ElementRef<'_>) -> Result<StatTable> {
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("th, td")?;

    let mut rows = table.select(&row_selector);
    let header = rows.next().ok_or_else(|| ScrapeError::parse("table has no rows"))?;
    let columns: Vec<String> = header.select(&cell_selector).map(cell_text).collect();
    if columns.is_empty() {
        return Err(ScrapeError::parse("header row has no cells"));
    }

    let mut stats = StatTable::new(columns);
    for row in rows {
        let values: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if is_blank(&values) {
            continue;
        }
        stats.push_row(values);
    }

    Ok(stats)
}

fn is_blank(values: &[String]) -> bool {
    values.iter().all(|v| v.is_empty())
}

/// Direct `<tr>` children of a table section
fn child_rows(section: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    section.children().filter_map(ElementRef::wrap).filter(|el| el.value().name() == "tr")
}

/// Direct `<th>`/`<td>` children of a row, so nested tables stay out
fn row_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
}

fn header_names(row: ElementRef<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for cell in row_cells(row) {
        let text = cell_text(cell);
        for _ in 0..colspan(cell) {
            names.push(text.clone());
        }
    }

    for (index, name) in names.iter_mut().enumerate() {
        if name.is_empty() {
            *name = format!("column_{}", index + 1);
        }
    }
    names
}

fn row_values(row: ElementRef<'_>) -> Vec<String> {
    let mut values = Vec::new();
    for cell in row_cells(row) {
        values.push(cell_text(cell));
        values.extend(std::iter::repeat(String::new()).take(colspan(cell) - 1));
    }
    values
}

/// Header rows repeated inside the body: flagged by class, or made only of
/// `<th>` cells whose text matches the header
fn is_repeated_header(row: ElementRef<'_>, columns: &[String]) -> bool {
    if row.value().classes().any(|c| c == "thead" || c == "over_header") {
        return true;
    }

    let cells: Vec<ElementRef<'_>> = row_cells(row).collect();
    !cells.is_empty()
        && cells.iter().all(|cell| cell.value().name() == "th")
        && header_names(row) == columns
}

/// `hidden` attribute, `hidden` class, or inline `display: none`
fn is_hidden(row: ElementRef<'_>) -> bool {
    let element = row.value();
    if element.attr("hidden").is_some() || element.classes().any(|c| c.eq_ignore_ascii_case("hidden")) {
        return true;
    }

    element.attr("style").is_some_and(|style| {
        style.split(';').any(|declaration| {
            let compact: String = declaration.chars().filter(|c| !c.is_whitespace()).collect();
            compact.eq_ignore_ascii_case("display:none")
        })
    })
}

fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .filter(|span| *span > 0)
        .map_or(1, |span| span.min(MAX_COLSPAN))
}

/// Visible text with whitespace runs collapsed
fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_table(html: &str, strategy: ExtractStrategy) -> Result<StatTable> {
        let doc = Html::parse_document(html);
        let table = TableLocator::table("t").locate(&doc)?.expect("fixture has table#t");
        extract_rows(table, strategy)
    }

    const BATTING: &str = r#"
        <table id="t">
          <thead>
            <tr class="over_header"><th colspan="2"></th><th colspan="2">Standard</th></tr>
            <tr><th>Year</th><th>Tm</th><th>HR</th><th>BA</th></tr>
          </thead>
          <tbody>
            <tr><th>1954</th><td>MLN</td><td>13</td><td>.280</td></tr>
            <tr class="hidden"><th>1999</th><td>XXX</td><td>0</td><td>.000</td></tr>
            <tr class="thead"><th>Year</th><th>Tm</th><th>HR</th><th>BA</th></tr>
            <tr><th></th><td> </td><td></td><td></td></tr>
            <tr style="color: red; display : none"><th>1998</th><td>YYY</td><td>0</td><td>.000</td></tr>
            <tr><th>1955</th><td>MLN</td><td>
                27
            </td><td>.314</td></tr>
          </tbody>
          <tfoot>
            <tr><th>Career</th><td colspan="2">755</td><td>.305</td></tr>
          </tfoot>
        </table>
    "#;

    #[test]
    fn test_header_is_last_thead_row() {
        let table = first_table(BATTING, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.columns(), ["Year", "Tm", "HR", "BA"]);
    }

    #[test]
    fn test_skips_hidden_repeated_header_and_blank_rows() {
        let table = first_table(BATTING, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.column("Year").unwrap(), vec!["1954", "1955", "Career"]);
    }

    #[test]
    fn test_cell_whitespace_is_collapsed() {
        let table = first_table(BATTING, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.get(1, "HR"), Some("27"));
    }

    #[test]
    fn test_colspan_keeps_columns_aligned() {
        let table = first_table(BATTING, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.get(2, "Tm"), Some("755"));
        assert_eq!(table.get(2, "HR"), Some(""));
        assert_eq!(table.get(2, "BA"), Some(".305"));
    }

    #[test]
    fn test_hidden_attribute_row_is_skipped() {
        let html = r#"<table id="t">
            <thead><tr><th>Year</th><th>HR</th></tr></thead>
            <tbody>
              <tr hidden><td>1999</td><td>0</td></tr>
              <tr><td>2000</td><td>12</td></tr>
            </tbody>
        </table>"#;
        let table = first_table(html, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.column("Year").unwrap(), vec!["2000"]);
    }

    #[test]
    fn test_no_thead_uses_first_visible_row() {
        let html = r#"<table id="t">
            <tr style="display:none"><td>junk</td><td>junk</td></tr>
            <tr><td>Pitch</td><td>MPH</td></tr>
            <tr><td>4-Seam</td><td>96.1</td></tr>
            <tr><td>Slider</td><td>85.0</td><td>extra</td></tr>
        </table>"#;
        let table = first_table(html, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.columns(), ["Pitch", "MPH"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].values(), ["Slider", "85.0"]);
    }

    #[test]
    fn test_blank_header_cells_get_names() {
        let html = r#"<table id="t"><thead><tr><th></th><th>xBA</th></tr></thead>
            <tbody><tr><td>2024</td><td>.301</td></tr></tbody></table>"#;
        let table = first_table(html, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.columns(), ["column_1", "xBA"]);
    }

    #[test]
    fn test_nested_tables_are_ignored_by_visible_rows() {
        let html = r#"<table id="t">
            <thead><tr><th>Year</th><th>Notes</th></tr></thead>
            <tbody><tr><td>2017</td><td><table><tr><td>inner</td></tr></table></td></tr></tbody>
        </table>"#;
        let table = first_table(html, ExtractStrategy::VisibleRows).unwrap();
        assert_eq!(table.len(), 1);

        // The legacy walk picks the nested row up as data
        let legacy = first_table(html, ExtractStrategy::Legacy).unwrap();
        assert_eq!(legacy.len(), 2);
    }

    #[test]
    fn test_legacy_keeps_hidden_rows() {
        let html = r#"<table id="t">
            <tr><th>Year</th><th>HR</th></tr>
            <tr class="hidden"><td>1999</td><td>0</td></tr>
            <tr><td></td><td></td></tr>
            <tr><td>2000</td><td>12</td></tr>
        </table>"#;
        let table = first_table(html, ExtractStrategy::Legacy).unwrap();
        assert_eq!(table.column("Year").unwrap(), vec!["1999", "2000"]);
    }

    #[test]
    fn test_table_without_rows_is_parse_error() {
        let err = first_table(r#"<table id="t"></table>"#, ExtractStrategy::VisibleRows).unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_spec_reports_missing_table() {
        let spec = TableSpec::new(TableLocator::table("pitching_standard"));
        let err = spec.extract("<html><body><p>batter</p></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::TableNotFound(ref l) if l == "table#pitching_standard"));
    }

    #[test]
    fn test_spec_reports_header_only_table_as_empty() {
        let spec = TableSpec::new(TableLocator::table("t"));
        let err = spec
            .extract(r#"<table id="t"><thead><tr><th>A</th></tr></thead><tbody><tr><td></td></tr></tbody></table>"#)
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Empty(_)));
    }

    #[test]
    fn test_spec_drops_trailing_summary_rows() {
        let spec = TableSpec::new(TableLocator::first_table_in("box")).dropping_trailing(1);
        let table = spec
            .extract(
                r#"<div id="box"><table>
                    <thead><tr><th>Season</th><th>EV</th></tr></thead>
                    <tbody><tr><td>2023</td><td>93.1</td></tr><tr><td>2024</td><td>94.0</td></tr>
                    <tr><td>MLB</td><td>88.5</td></tr></tbody>
                </table></div>"#,
            )
            .unwrap();
        assert_eq!(table.column("Season").unwrap(), vec!["2023", "2024"]);
    }

    #[test]
    fn test_spec_reads_table_commented_out_inside_container() {
        let spec = TableSpec::new(TableLocator::first_table_in("all_x"));
        let table = spec
            .extract(
                r#"<div id="all_x"><h2>Value</h2><!--
                    <div id="div_x"><table id="x"><tr><th>Year</th><th>WAR</th></tr>
                    <tr><td>1957</td><td>8.0</td></tr></table></div>
                --></div>"#,
            )
            .unwrap();
        assert_eq!(table.get(0, "WAR"), Some("8.0"));
    }

    #[test]
    fn test_spec_reads_commented_table() {
        let spec = TableSpec::new(TableLocator::table("t"));
        let table = spec
            .extract(
                r#"<div id="all_t"><!-- <table id="t"><tr><th>A</th></tr><tr><td>1</td></tr></table> --></div>"#,
            )
            .unwrap();
        assert_eq!(table.get(0, "A"), Some("1"));
    }
}
