//! Finding a statistics table inside a parsed page

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScrapeError};

/// Where a table lives in the DOM: a table id, a container id, or both.
///
/// With only a container, the first table inside it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLocator {
    container_id: Option<String>,
    table_id: Option<String>,
}

impl TableLocator {
    /// `<table id="...">` anywhere on the page
    pub fn table(table_id: impl Into<String>) -> Self {
        Self { container_id: None, table_id: Some(table_id.into()) }
    }

    /// First `<table>` inside the element with this id
    pub fn first_table_in(container_id: impl Into<String>) -> Self {
        Self { container_id: Some(container_id.into()), table_id: None }
    }

    /// `<table id="...">` inside the element with the given container id
    pub fn table_in(container_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self { container_id: Some(container_id.into()), table_id: Some(table_id.into()) }
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    /// Find the table. `Ok(None)` means the page has no such table.
    pub fn locate<'a>(&self, document: &'a Html) -> Result<Option<ElementRef<'a>>> {
        let table_selector = self.table_selector()?;

        if self.container_id.is_none() {
            return Ok(document.select(&table_selector).next());
        }

        Ok(self
            .container(document)?
            .and_then(|container| container.select(&table_selector).next()))
    }

    /// Find the table by its own selector only, ignoring the container.
    /// Used on fragments cut out of a container's comments.
    pub fn locate_table<'a>(&self, fragment: &'a Html) -> Result<Option<ElementRef<'a>>> {
        Ok(fragment.select(&self.table_selector()?).next())
    }

    /// Some pages ship secondary tables inside HTML comments and un-comment
    /// them in script. Returns the parsed comment holding the table.
    ///
    /// Comments inside the container are tried first, then any comment on
    /// the page mentioning the container or table id.
    pub fn find_in_comments(&self, document: &Html) -> Result<Option<Html>> {
        let table_selector = self.table_selector()?;
        let has_table = |fragment: &Html| fragment.select(&table_selector).next().is_some();

        if let Some(container) = self.container(document)? {
            let fragment = container
                .descendants()
                .filter_map(|node| comment_text(node.value()))
                .map(Html::parse_fragment)
                .find(|fragment| has_table(fragment));
            if fragment.is_some() {
                return Ok(fragment);
            }
        }

        let Some(anchor) = self.container_id.as_deref().or(self.table_id.as_deref()) else {
            return Ok(None);
        };
        let needles = [format!("id=\"{anchor}\""), format!("id='{anchor}'")];

        Ok(document
            .tree
            .nodes()
            .filter_map(|node| comment_text(node.value()))
            .filter(|text| needles.iter().any(|needle| text.contains(needle.as_str())))
            .map(Html::parse_fragment)
            .find(|fragment| has_table(fragment)))
    }

    fn table_selector(&self) -> Result<Selector> {
        match &self.table_id {
            Some(id) => id_selector("table", id),
            None => parse_selector("table"),
        }
    }

    fn container<'a>(&self, document: &'a Html) -> Result<Option<ElementRef<'a>>> {
        let Some(container_id) = &self.container_id else {
            return Ok(None);
        };
        Ok(document.select(&id_selector("", container_id)?).next())
    }
}

impl fmt::Display for TableLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.container_id, &self.table_id) {
            (Some(container), Some(table)) => write!(f, "#{container} table#{table}"),
            (Some(container), None) => write!(f, "#{container} table"),
            (None, Some(table)) => write!(f, "table#{table}"),
            (None, None) => f.write_str("table"),
        }
    }
}

/// `tag[id="value"]`, quoting the id so unusual characters cannot break the selector
fn id_selector(tag: &str, id: &str) -> Result<Selector> {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    parse_selector(&format!("{tag}[id=\"{escaped}\"]"))
}

fn comment_text(node: &Node) -> Option<&str> {
    match node {
        Node::Comment(comment) => Some(&**comment),
        _ => None,
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::parse(format!("invalid selector '{css}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table id="batting_standard"><tr><th>Year</th></tr><tr><td>1957</td></tr></table>
          <div id="statcast_glance_batter">
            <h3>Statcast</h3>
            <div class="wrap">
              <table class="first"><tr><th>Season</th></tr></table>
              <table class="second"><tr><th>Other</th></tr></table>
            </div>
          </div>
          <div id="all_team_pitching">
            <!--
            <div class="table_container"><table id="team_pitching"><tr><th>Name</th></tr></table></div>
            -->
          </div>
        </body></html>
    "#;

    #[test]
    fn test_locate_by_table_id() {
        let doc = Html::parse_document(PAGE);
        let table = TableLocator::table("batting_standard").locate(&doc).unwrap().unwrap();
        assert_eq!(table.value().attr("id"), Some("batting_standard"));
    }

    #[test]
    fn test_locate_first_table_in_container() {
        let doc = Html::parse_document(PAGE);
        let table = TableLocator::first_table_in("statcast_glance_batter").locate(&doc).unwrap().unwrap();
        assert!(table.value().classes().any(|c| c == "first"));
    }

    #[test]
    fn test_missing_table_or_container_is_none() {
        let doc = Html::parse_document(PAGE);
        assert!(TableLocator::table("pitching_standard").locate(&doc).unwrap().is_none());
        assert!(TableLocator::first_table_in("statcast_stats_pitching").locate(&doc).unwrap().is_none());
        assert!(TableLocator::table_in("statcast_glance_batter", "batting_standard")
            .locate(&doc)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_id_must_match_exactly() {
        let doc = Html::parse_document(PAGE);
        assert!(TableLocator::table("batting").locate(&doc).unwrap().is_none());
    }

    #[test]
    fn test_commented_table_is_found_in_comments() {
        let doc = Html::parse_document(PAGE);
        let locator = TableLocator::table("team_pitching");
        assert!(locator.locate(&doc).unwrap().is_none());

        let fragment = locator.find_in_comments(&doc).unwrap().unwrap();
        let table = locator.locate_table(&fragment).unwrap().unwrap();
        assert_eq!(table.value().attr("id"), Some("team_pitching"));
    }

    #[test]
    fn test_commented_table_inside_container() {
        // The wrapper holds the comment, so the comment never names the wrapper
        let doc = Html::parse_document(PAGE);
        let locator = TableLocator::first_table_in("all_team_pitching");
        assert!(locator.locate(&doc).unwrap().is_none());

        let fragment = locator.find_in_comments(&doc).unwrap().unwrap();
        let table = locator.locate_table(&fragment).unwrap().unwrap();
        assert_eq!(table.value().attr("id"), Some("team_pitching"));

        let by_id = TableLocator::table_in("all_team_pitching", "team_pitching");
        assert!(by_id.find_in_comments(&doc).unwrap().is_some());
    }

    #[test]
    fn test_comment_without_the_table_is_skipped() {
        let doc = Html::parse_document(
            r#"<div id="all_x"><!-- <p>ad</p> --><!-- <table id="x"><tr><td>1</td></tr></table> --></div>"#,
        );
        let locator = TableLocator::table_in("all_x", "x");
        let fragment = locator.find_in_comments(&doc).unwrap().unwrap();
        assert!(locator.locate_table(&fragment).unwrap().is_some());
    }

    #[test]
    fn test_comment_search_misses_cleanly() {
        let doc = Html::parse_document(PAGE);
        assert!(TableLocator::table("nope").find_in_comments(&doc).unwrap().is_none());
        assert!(TableLocator::first_table_in("statcast_glance_batter")
            .find_in_comments(&doc)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_odd_ids_do_not_break_selectors() {
        let doc = Html::parse_document(r#"<table id='a"b'><tr><td>x</td></tr></table>"#);
        assert!(TableLocator::table("a\"b").locate(&doc).unwrap().is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(TableLocator::table("team_batting").to_string(), "table#team_batting");
        assert_eq!(TableLocator::first_table_in("pitchingBreakdown").to_string(), "#pitchingBreakdown table");
    }
}
