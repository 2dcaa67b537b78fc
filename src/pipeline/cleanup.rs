//! Report cleanup: strip notebook chrome from exported HTML.
//!
//! Notebook exporters wrap every cell in several layers of presentation
//! `<div>`s (prompts, wrappers, output areas). Reports are embedded in a
//! larger site, so that chrome is removed and the content kept:
//!
//! 1. **Removal** — elements whose class list contains one of
//!    [`REMOVED_CLASSES`] are dropped together with their children.
//! 2. **Unwrapping** — elements whose class list contains one of
//!    [`UNWRAPPED_CLASSES`] are replaced by their children, in order.
//! 3. **Tables** — a `<table>` without an `id` loses all attributes (the
//!    exporter's styling classes); tables with an `id` are left untouched.
//! 4. **Code blocks** — each `<pre>`'s contents are moved into a single
//!    `<code>` child, the shape syntax highlighters expect.
//!
//! Removal wins over unwrapping when an element carries both kinds of class.
//! All edits operate on the parsed tree, never on the markup text.

use crate::error::DocReportError;
use crate::pipeline::dom;
use markup5ever_rcdom::Handle;
use tracing::debug;

/// Classes whose elements are deleted outright.
pub const REMOVED_CLASSES: &[&str] = &["output_text", "prompt"];

/// Presentation wrappers replaced by their children.
pub const UNWRAPPED_CLASSES: &[&str] = &[
    "border-box-sizing",
    "container",
    "cell",
    "inner_cell",
    "rendered_html",
    "output_prompt",
    "output_wrapper",
    "output",
    "output_area",
];

/// Counts of structural edits applied by [`clean_html`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub removed: usize,
    pub unwrapped: usize,
    pub tables_stripped: usize,
    pub code_blocks: usize,
}

/// Parse `html`, apply every cleanup rule, and serialise the result.
pub fn clean_html(html: &str) -> Result<(String, CleanupStats), DocReportError> {
    let dom = dom::parse(html);
    let mut stats = CleanupStats::default();

    prune_children(&dom.document, &mut stats);
    strip_table_attributes(&dom.document, &mut stats);
    wrap_code_blocks(&dom.document, &mut stats);

    debug!("Cleanup: {:?}", stats);
    Ok((dom::to_html(&dom)?, stats))
}

// ── Rules 1 + 2: removal and unwrapping ──────────────────────────────────────

/// Rebuild `node`'s child list, dropping removed elements and splicing the
/// (already pruned) children of wrapper elements in their place.
fn prune_children(node: &Handle, stats: &mut CleanupStats) {
    let old_children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    let mut new_children = Vec::with_capacity(old_children.len());

    for child in old_children {
        if is_any_class(&child, REMOVED_CLASSES) {
            stats.removed += 1;
            continue;
        }

        prune_children(&child, stats);

        if is_any_class(&child, UNWRAPPED_CLASSES) {
            stats.unwrapped += 1;
            new_children.extend(child.children.borrow_mut().drain(..));
        } else {
            new_children.push(child);
        }
    }

    dom::adopt(node, &new_children);
    *node.children.borrow_mut() = new_children;
}

fn is_any_class(node: &Handle, classes: &[&str]) -> bool {
    classes.iter().any(|c| dom::has_class(node, c))
}

// ── Rule 3: tables ───────────────────────────────────────────────────────────

fn strip_table_attributes(root: &Handle, stats: &mut CleanupStats) {
    for table in dom::find_elements(root, "table") {
        if dom::attribute(&table, "id").is_none() {
            dom::clear_attributes(&table);
            stats.tables_stripped += 1;
        }
    }
}

// ── Rule 4: code blocks ──────────────────────────────────────────────────────

fn wrap_code_blocks(root: &Handle, stats: &mut CleanupStats) {
    for pre in dom::find_elements(root, "pre") {
        if is_wrapped(&pre) {
            continue;
        }
        let code = dom::create_element("code");
        let contents: Vec<Handle> = pre.children.borrow_mut().drain(..).collect();
        dom::adopt(&code, &contents);
        *code.children.borrow_mut() = contents;

        dom::adopt(&pre, std::slice::from_ref(&code));
        pre.children.borrow_mut().push(code);
        stats.code_blocks += 1;
    }
}

/// A `<pre>` whose only child is a `<code>` element already has the target shape.
fn is_wrapped(pre: &Handle) -> bool {
    let children = pre.children.borrow();
    children.len() == 1 && dom::tag_name(&children[0]) == Some("code")
}
