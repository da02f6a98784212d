//! Print-layout fix-ups for the summary of findings HTML.
//!
//! The report is designed for a browser: the coverage section starts
//! collapsed behind a click handler, tables split across pages, the logo
//! shrinks and the "Generated on" banner wraps when wkhtmltopdf lays the page
//! out for print. Each rule below patches one of those problems by editing
//! attributes in the parsed DOM.
//!
//! ## Rule Order
//!
//! Rules run in a fixed order but touch disjoint elements and attributes, so
//! the result does not depend on it. Every rule is a fixed point after one
//! pass and is a no-op when its target is absent.

use crate::error::Sof2PdfError;
use kuchikiki::traits::*;
use kuchikiki::{ElementData, NodeDataRef, NodeRef};
use tracing::debug;

/// Inline style that keeps a table on a single page.
pub const NO_PAGE_BREAK_STYLE: &str = "page-break-inside: avoid !important";
/// Inline style pinning the logo height.
pub const LOGO_STYLE: &str = "height:85px;";
/// Inline style keeping the over-header banner on one line.
pub const NO_WRAP_STYLE: &str = "white-space:nowrap;";
/// Inline style removing the report drop-shadow.
pub const NO_SHADOW_STYLE: &str = "box-shadow:none;";

/// Apply all layout fix-ups to a report and return the re-serialised HTML.
///
/// Rules (applied in order):
/// 1. Expand the coverage section and drop its collapse toggle
/// 2. Keep annex tables (those with a "Name" header) on one page
/// 3. Pin the logo height
/// 4. Stop the over-header banner wrapping
/// 5. Remove the report drop-shadow
pub fn fix_formatting(html: &str) -> Result<String, Sof2PdfError> {
    let document = kuchikiki::parse_html().one(html);

    let n = expand_coverage(&document)?;
    debug!("expand_coverage: {} nodes changed", n);
    let n = stop_annex_tables_splitting(&document)?;
    debug!("stop_annex_tables_splitting: {} tables changed", n);
    let n = fix_logo(&document)?;
    debug!("fix_logo: {} images changed", n);
    let n = stop_over_header_wrap(&document)?;
    debug!("stop_over_header_wrap: {} elements changed", n);
    let n = remove_drop_shadow(&document)?;
    debug!("remove_drop_shadow: {} elements changed", n);

    Ok(document.to_string())
}

/// Collect every element under `root` matching `selector`.
///
/// Matches are collected up front so callers may detach nodes while
/// walking the result.
fn select_all(
    root: &NodeRef,
    selector: &str,
) -> Result<Vec<NodeDataRef<ElementData>>, Sof2PdfError> {
    root.select(selector)
        .map(|matches| matches.collect())
        .map_err(|()| Sof2PdfError::Internal(format!("invalid CSS selector '{selector}'")))
}

fn set_style(element: &NodeDataRef<ElementData>, style: &str) {
    element
        .attributes
        .borrow_mut()
        .insert("style", style.to_string());
}

// ── Rule 1: Expand coverage section ──────────────────────────────────────────

/// Show the coverage section and remove its expand/collapse affordances.
///
/// Returns the number of nodes changed or removed.
pub(crate) fn expand_coverage(root: &NodeRef) -> Result<usize, Sof2PdfError> {
    let mut changed = 0;

    for section in select_all(root, "#coverage")? {
        if section.attributes.borrow_mut().remove("hidden").is_some() {
            changed += 1;
        }
    }

    for link in select_all(root, "a")? {
        if link.as_node().text_contents().contains("Coverage Metrics") {
            let mut attrs = link.attributes.borrow_mut();
            let onclick = attrs.remove("onclick").is_some();
            let style = attrs.remove("style").is_some();
            if onclick || style {
                changed += 1;
            }
        }
    }

    for hint in select_all(root, "small")? {
        if hint.as_node().text_contents().contains("Click to collapse/expand") {
            hint.as_node().detach();
            changed += 1;
        }
    }

    Ok(changed)
}

// ── Rule 2: Keep annex tables on one page ────────────────────────────────────

/// Forbid page breaks inside any table whose header has a "Name" column.
///
/// The comparison is exact: a header cell reading " Name" or "name" does not
/// match.
pub(crate) fn stop_annex_tables_splitting(root: &NodeRef) -> Result<usize, Sof2PdfError> {
    let mut changed = 0;
    for table in select_all(root, "table")? {
        let has_name_column = select_all(table.as_node(), "thead th")?
            .iter()
            .any(|th| th.as_node().text_contents() == "Name");
        if has_name_column {
            set_style(&table, NO_PAGE_BREAK_STYLE);
            changed += 1;
        }
    }
    Ok(changed)
}

// ── Rule 3: Pin logo height ──────────────────────────────────────────────────

pub(crate) fn fix_logo(root: &NodeRef) -> Result<usize, Sof2PdfError> {
    let logos = select_all(root, "img.logo")?;
    for img in &logos {
        set_style(img, LOGO_STYLE);
    }
    Ok(logos.len())
}

// ── Rule 4: Keep the over-header on one line ─────────────────────────────────

pub(crate) fn stop_over_header_wrap(root: &NodeRef) -> Result<usize, Sof2PdfError> {
    let banners = select_all(root, ".over-header.content-div")?;
    for banner in &banners {
        set_style(banner, NO_WRAP_STYLE);
    }
    Ok(banners.len())
}

// ── Rule 5: Remove drop-shadow ───────────────────────────────────────────────

pub(crate) fn remove_drop_shadow(root: &NodeRef) -> Result<usize, Sof2PdfError> {
    let reports = select_all(root, "#report")?;
    for report in &reports {
        set_style(report, NO_SHADOW_STYLE);
    }
    Ok(reports.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> NodeRef {
        kuchikiki::parse_html().one(html)
    }

    fn attr(root: &NodeRef, selector: &str, name: &str) -> Option<String> {
        let el = root.select_first(selector).ok()?;
        let attrs = el.attributes.borrow();
        let value = attrs.get(name).map(str::to_string);
        value
    }

    const REPORT: &str = r#"<!DOCTYPE html>
<html><head><title>Summary of findings</title></head><body>
<div id="report" style="box-shadow: 0 0 5px #888">
  <div class="over-header content-div">Participant 123 Generated on: 18/02/2019</div>
  <img class="logo" src="logo.png" style="height:40%">
  <a onclick="toggle('coverage')" style="cursor:pointer">Coverage Metrics <small>Click to collapse/expand</small></a>
  <div id="coverage" hidden>coverage table</div>
  <table id="annex"><thead><tr><th>Name</th><th>Version</th></tr></thead>
    <tbody><tr><td>Ensembl</td><td>90</td></tr></tbody></table>
  <table id="variants"><thead><tr><th>Gene</th></tr></thead></table>
</div>
</body></html>"#;

    #[test]
    fn test_expand_coverage_removes_hidden() {
        let doc = parse(r#"<div id="coverage" hidden class="x"></div>"#);
        assert_eq!(expand_coverage(&doc).unwrap(), 1);
        assert_eq!(attr(&doc, "#coverage", "hidden"), None);
        assert_eq!(attr(&doc, "#coverage", "class").as_deref(), Some("x"));
    }

    #[test]
    fn test_expand_coverage_strips_toggle_link() {
        let doc = parse(REPORT);
        expand_coverage(&doc).unwrap();
        assert_eq!(attr(&doc, "a", "onclick"), None);
        assert_eq!(attr(&doc, "a", "style"), None);
        assert!(doc.select_first("small").is_err(), "hint should be removed");
        let link = doc.select_first("a").unwrap();
        assert!(link.as_node().text_contents().contains("Coverage Metrics"));
    }

    #[test]
    fn test_expand_coverage_leaves_other_links() {
        let doc = parse(r#"<a onclick="go()" style="color:red">Variants</a><small>footnote</small>"#);
        assert_eq!(expand_coverage(&doc).unwrap(), 0);
        assert_eq!(attr(&doc, "a", "onclick").as_deref(), Some("go()"));
        assert!(doc.select_first("small").is_ok());
    }

    #[test]
    fn test_expand_coverage_without_targets_is_noop() {
        let html = "<html><head></head><body><p>nothing here</p></body></html>";
        let doc = parse(html);
        assert_eq!(expand_coverage(&doc).unwrap(), 0);
        assert_eq!(doc.to_string(), parse(html).to_string());
    }

    #[test]
    fn test_annex_table_gets_no_break_style() {
        let doc = parse(REPORT);
        assert_eq!(stop_annex_tables_splitting(&doc).unwrap(), 1);
        assert_eq!(
            attr(&doc, "#annex", "style").as_deref(),
            Some(NO_PAGE_BREAK_STYLE)
        );
        assert_eq!(attr(&doc, "#variants", "style"), None);
    }

    #[test]
    fn test_annex_match_is_exact() {
        let doc = parse(
            r#"<table id="a"><thead><tr><th> Name</th></tr></thead></table>
               <table id="b"><thead><tr><th>name</th></tr></thead></table>
               <table id="c"><tr><th>Name</th></tr></table>"#,
        );
        assert_eq!(stop_annex_tables_splitting(&doc).unwrap(), 0);
        for id in ["#a", "#b", "#c"] {
            assert_eq!(attr(&doc, id, "style"), None, "{id} should be untouched");
        }
    }

    #[test]
    fn test_fix_logo() {
        let doc = parse(r#"<img class="logo" src="a.png"><img class="banner" src="b.png">"#);
        assert_eq!(fix_logo(&doc).unwrap(), 1);
        assert_eq!(attr(&doc, "img.logo", "style").as_deref(), Some(LOGO_STYLE));
        assert_eq!(attr(&doc, "img.banner", "style"), None);
    }

    #[test]
    fn test_over_header_needs_both_classes() {
        let doc = parse(
            r#"<div id="both" class="over-header content-div"></div>
               <div id="one" class="over-header"></div>"#,
        );
        assert_eq!(stop_over_header_wrap(&doc).unwrap(), 1);
        assert_eq!(attr(&doc, "#both", "style").as_deref(), Some(NO_WRAP_STYLE));
        assert_eq!(attr(&doc, "#one", "style"), None);
    }

    #[test]
    fn test_remove_drop_shadow() {
        let doc = parse(REPORT);
        assert_eq!(remove_drop_shadow(&doc).unwrap(), 1);
        assert_eq!(attr(&doc, "#report", "style").as_deref(), Some(NO_SHADOW_STYLE));
    }

    #[test]
    fn test_fix_formatting_full_pipeline() {
        let out = fix_formatting(REPORT).unwrap();
        assert!(!out.contains("hidden"));
        assert!(!out.contains("onclick"));
        assert!(!out.contains("Click to collapse/expand"));
        assert!(out.contains(NO_PAGE_BREAK_STYLE));
        assert!(out.contains(LOGO_STYLE));
        assert!(out.contains(NO_WRAP_STYLE));
        assert!(out.contains(NO_SHADOW_STYLE));
        assert!(out.contains("Ensembl"));
    }

    #[test]
    fn test_fix_formatting_is_idempotent() {
        let once = fix_formatting(REPORT).unwrap();
        let twice = fix_formatting(&once).unwrap();
        assert_eq!(once, twice);
    }
}
