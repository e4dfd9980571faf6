//! HTML rewrite engine: tracked-link substitution and open-pixel injection.
//!
//! The engine parses the email body into an owned tree, mutates anchor
//! attributes in place, appends the open pixel, and serializes the tree back
//! to a string. Mutation always goes through the parsed tree, never through
//! string search-and-replace, so encoded entities and nested quotes survive
//! untouched.

use ego_tree::NodeId;
use html_escape::encode_double_quoted_attribute;
use scraper::{Html, Node, Selector};
use tracing::{debug, info};

use crate::types::LinkMapping;

/// Rewrite tracked links and append the open pixel.
///
/// Mappings are applied in sequence order against the live tree: each mapping
/// rewrites every anchor whose `href` is byte-for-byte equal to its
/// `original_url` at the time it is processed. Hrefs differing by whitespace
/// or case are left untouched. The pixel is appended exactly once per call.
///
/// Parsing never fails: fragments without `<html>`/`<body>` wrappers and
/// malformed markup are normalized, and the empty string yields a minimal
/// document containing only the pixel.
pub fn rewrite(html_content: &str, links: &[LinkMapping], pixel_url: &str) -> String {
    let mut document = Html::parse_document(html_content);

    let mut anchors_rewritten = 0;
    for link in links {
        anchors_rewritten += rewrite_anchors(&mut document, link);
    }

    inject_pixel(&mut document, pixel_url);

    info!(
        mappings = links.len(),
        anchors_rewritten = anchors_rewritten,
        html_length = html_content.len(),
        "rewrite_complete"
    );

    document.html()
}

/// Rewrite every anchor whose `href` exactly equals the mapping's original
/// URL. Returns the number of anchors rewritten.
fn rewrite_anchors(document: &mut Html, link: &LinkMapping) -> usize {
    let selector = Selector::parse("a").expect("Invalid selector");

    // Collect matches first; the tree cannot be mutated while a selection
    // borrows it.
    let matches: Vec<NodeId> = document
        .select(&selector)
        .filter(|a| a.value().attr("href") == Some(link.original_url.as_str()))
        .map(|a| a.id())
        .collect();

    for id in &matches {
        if let Some(mut node) = document.tree.get_mut(*id) {
            if let Node::Element(element) = node.value() {
                for (name, value) in element.attrs.iter_mut() {
                    if &*name.local == "href" {
                        *value = link.tracking_url.as_str().into();
                    }
                }
            }
        }
    }

    debug!(
        original_url = %link.original_url,
        tracking_url = %link.tracking_url,
        anchors = matches.len(),
        "mapping_applied"
    );

    matches.len()
}

/// Append the open pixel as the last child of `<body>`, or at the root of the
/// tree when no body container exists (e.g. frameset documents), so the pixel
/// survives serialization for any input.
fn inject_pixel(document: &mut Html, pixel_url: &str) {
    let pixel = pixel_node(pixel_url);

    let selector = Selector::parse("body").expect("Invalid selector");
    let body = document.select(&selector).next().map(|body| body.id());

    match body {
        Some(id) => {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.append(pixel);
            }
        }
        None => {
            document.tree.root_mut().append(pixel);
        }
    }

    debug!(has_body = body.is_some(), "pixel_injected");
}

/// Build the open-pixel node: a 1x1 image forced invisible, with an empty
/// `alt`, so mail clients that render images trigger exactly one fetch
/// without visibly altering layout.
fn pixel_node(pixel_url: &str) -> Node {
    let markup = format!(
        r#"<img src="{}" width="1" height="1" style="display:none;" alt="">"#,
        encode_double_quoted_attribute(pixel_url)
    );

    let fragment = Html::parse_fragment(&markup);
    let selector = Selector::parse("img").expect("Invalid selector");
    let img = fragment
        .select(&selector)
        .next()
        .expect("pixel markup always parses to an img element");

    Node::Element(img.value().clone())
}
