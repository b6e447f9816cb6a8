//! HTML to markdown conversion
//!
//! The extraction model works on text, not markup. The page is cleaned with
//! `scraper` first, dropping:
//!
//! - `<script>`, `<style>`, `<noscript>`, `<svg>`, `<iframe>`, `<template>`
//! - `<head>` metadata
//! - overlay elements (cookie banners, consent dialogs, modals, popups)
//!
//! and the remaining body is rendered to markdown with `html2md`, which keeps
//! headings, lists and one table row per line.

use html2md::parse_html;
use scraper::{ElementRef, Html, Selector};

const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "svg", "iframe", "template", "canvas",
];

const OVERLAY_MARKERS: &[&str] = &["cookie", "consent", "modal", "popup", "overlay"];

/// Converts an HTML document to markdown
///
/// # Example
///
/// ```
/// use sumi_extract::crawler::html_to_markdown;
///
/// let html = "<h2>Ranking</h2><table><tr><th>Rank</th><th>Model</th></tr>\
///             <tr><td>1</td><td>GPT-4o</td></tr></table>";
/// let text = html_to_markdown(html);
/// assert!(text.contains("Ranking"));
/// assert!(text.lines().any(|line| line.contains("GPT-4o") && line.contains('|')));
/// ```
pub fn html_to_markdown(html: &str) -> String {
    let cleaned = clean_html(html);
    if cleaned.trim().is_empty() {
        return String::new();
    }

    parse_html(&cleaned).trim().to_string()
}

/// Removes non-content elements and returns the inner HTML of the body
pub fn clean_html(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let removed: Vec<_> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| SKIPPED_TAGS.contains(&element.value().name()) || is_overlay(*element))
        .map(|element| element.id())
        .collect();

    for id in removed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|body| body.inner_html()));

    body.unwrap_or_else(|| document.root_element().inner_html())
}

fn is_overlay(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let markers = [value.id().unwrap_or(""), value.attr("class").unwrap_or("")];

    markers.iter().any(|attr| {
        let attr = attr.to_ascii_lowercase();
        OVERLAY_MARKERS.iter().any(|marker| attr.contains(marker))
    }) || value.attr("role") == Some("dialog")
}
