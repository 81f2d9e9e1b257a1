//! Reading-order reconstruction for positioned PDF text runs.
//!
//! PDF content streams place glyph runs at absolute coordinates with no line or
//! paragraph structure. This module rebuilds top-to-bottom, left-to-right text:
//!
//! 1. Drop runs whose trimmed text is empty.
//! 2. Sort by baseline `y` descending (PDF origin is bottom-left).
//! 3. Walk the sorted runs. A run starts a new line when it sits more than
//!    `line_tolerance` below the previous run; otherwise it joins the current
//!    line, so a slow baseline drift stays on one line.
//! 4. Sort each band by `x` ascending and join its runs with single spaces.
//! 5. Join bands with `\n`.
//!
//! Sorting uses `f64::total_cmp` and stable sorts, so identical input always
//! produces identical output. Multi-column layouts interleave columns within a
//! band; that is a known limit of the heuristic.

use rayon::prelude::*;

use crate::extraction::models::{PageText, TextRun};

/// Vertical distance (page units) within which two runs share a printed line.
pub const DEFAULT_LINE_TOLERANCE: f64 = 5.0;

/// Inserted between pages so later stages can find and remove the seams.
pub const PAGE_BREAK_MARKER: &str = "--- Page Break ---";
pub const PAGE_SEPARATOR: &str = "\n\n--- Page Break ---\n\n";

/// Groups runs into reading-order lines. Each inner vec is one visual line,
/// already sorted left to right, holding trimmed run text.
pub fn group_lines(runs: &[TextRun], line_tolerance: f64) -> Vec<Vec<String>> {
    let mut kept: Vec<(&str, f64, f64)> = runs
        .iter()
        .map(|r| (r.text.trim(), r.x, r.y))
        .filter(|(text, _, _)| !text.is_empty())
        .collect();

    kept.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut bands: Vec<Vec<(&str, f64)>> = Vec::new();
    let mut previous_y: Option<f64> = None;

    for (text, x, y) in kept {
        let starts_line = previous_y.map_or(true, |prev| prev - y > line_tolerance);
        if starts_line {
            bands.push(Vec::new());
        }
        if let Some(band) = bands.last_mut() {
            band.push((text, x));
        }
        previous_y = Some(y);
    }

    bands
        .into_iter()
        .map(|mut band| {
            band.sort_by(|a, b| a.1.total_cmp(&b.1));
            band.into_iter().map(|(text, _)| text.to_string()).collect()
        })
        .collect()
}

/// Rebuilds one page's text in reading order.
pub fn reconstruct_page(runs: &[TextRun], line_tolerance: f64) -> String {
    group_lines(runs, line_tolerance)
        .iter()
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Rebuilds every page. Pages are processed in parallel; the indexed collect
/// keeps the output in input page order.
pub fn reconstruct_pages(pages: &[Vec<TextRun>], line_tolerance: f64) -> Vec<PageText> {
    pages
        .par_iter()
        .enumerate()
        .map(|(index, runs)| PageText {
            page_number: index as u32 + 1,
            text: reconstruct_page(runs, line_tolerance),
        })
        .collect()
}

/// Concatenates pages in order, separated by the page-break marker.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Removes page-break seams, leaving one blank line where each seam was.
pub fn strip_page_breaks(text: &str) -> String {
    text.replace(PAGE_SEPARATOR, "\n\n")
        .replace(PAGE_BREAK_MARKER, "")
}
