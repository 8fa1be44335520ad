//! Tree dump in an HTML-like format.
//!
//! ```text
//! <div layout="width: 100; height: 10; top: 0; left: 0;" style="flex-direction: row; ">
//!   <div layout="width: 10; height: 10; top: 0; left: 0;" style="" has-custom-measure="true"></div>
//! </div>
//! ```
//!
//! Only style properties that differ from the config defaults are listed.

use std::fmt::Write;

use super::state::EngineState;
use super::style::{Edges, NodeStyle};
use super::RawNode;
use crate::types::PrintOptions;
use crate::value::{is_undefined, values_equal, Value};

/// Render the subtree under `raw`, or `None` if the node is unknown.
pub(crate) fn render(state: &EngineState, raw: RawNode, options: PrintOptions) -> Option<String> {
    state.nodes.get(&raw)?;
    let mut out = String::new();
    render_node(state, raw, options, 0, &mut out);
    Some(out)
}

fn render_node(
    state: &EngineState,
    raw: RawNode,
    options: PrintOptions,
    level: usize,
    out: &mut String,
) {
    let Some(node) = state.nodes.get(&raw) else {
        return;
    };
    indent(out, level);
    out.push_str("<div ");

    if options.contains(PrintOptions::LAYOUT) {
        let layout = &node.layout;
        let _ = write!(
            out,
            "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
            layout.width, layout.height, layout.top, layout.left
        );
    }

    if options.contains(PrintOptions::STYLE) {
        out.push_str("style=\"");
        write_style(out, &node.style);
        out.push_str("\" ");
    }

    if node.measure.is_some() {
        out.push_str("has-custom-measure=\"true\"");
    }
    out.push('>');

    if options.contains(PrintOptions::CHILDREN) && !node.children.is_empty() {
        for &child in &node.children {
            out.push('\n');
            render_node(state, child, options, level + 1, out);
        }
        out.push('\n');
        indent(out, level);
    }
    out.push_str("</div>");
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

// =============================================================================
// Style Properties
// =============================================================================

fn write_style(out: &mut String, style: &NodeStyle) {
    let defaults = NodeStyle::for_config(style.uses_web_defaults());

    let enums = [
        ("direction", style.direction.as_str(), defaults.direction.as_str()),
        ("flex-direction", style.flex_direction.as_str(), defaults.flex_direction.as_str()),
        ("justify-content", style.justify_content.as_str(), defaults.justify_content.as_str()),
        ("align-items", style.align_items.as_str(), defaults.align_items.as_str()),
        ("align-content", style.align_content.as_str(), defaults.align_content.as_str()),
        ("align-self", style.align_self.as_str(), defaults.align_self.as_str()),
        ("flex-wrap", style.flex_wrap.as_str(), defaults.flex_wrap.as_str()),
        ("overflow", style.overflow.as_str(), defaults.overflow.as_str()),
        ("display", style.display.as_str(), defaults.display.as_str()),
        ("position", style.position_type.as_str(), defaults.position_type.as_str()),
    ];
    for (name, value, default) in enums {
        if value != default {
            let _ = write!(out, "{name}: {value}; ");
        }
    }

    for (name, value) in [
        ("flex", style.flex),
        ("flex-grow", style.flex_grow),
        ("flex-shrink", style.flex_shrink),
        ("aspect-ratio", style.aspect_ratio),
    ] {
        if !is_undefined(value) {
            let _ = write!(out, "{name}: {value}; ");
        }
    }

    let values = [
        ("flex-basis", style.flex_basis, defaults.flex_basis),
        ("width", style.width, defaults.width),
        ("height", style.height, defaults.height),
        ("min-width", style.min_width, defaults.min_width),
        ("min-height", style.min_height, defaults.min_height),
        ("max-width", style.max_width, defaults.max_width),
        ("max-height", style.max_height, defaults.max_height),
    ];
    for (name, value, default) in values {
        if !same(value, default) {
            let _ = write!(out, "{name}: {value}; ");
        }
    }

    write_edges(out, "margin", &style.margin);
    write_edges(out, "padding", &style.padding);
    write_edges(out, "border", &style.border);
    write_edges(out, "position", &style.position);
}

fn write_edges(out: &mut String, name: &str, edges: &Edges) {
    for (edge, value) in edges.defined() {
        let _ = write!(out, "{name}-{}: {value}; ", edge.as_str());
    }
}

fn same(a: Value, b: Value) -> bool {
    a.unit() == b.unit() && (a.is_undefined() || values_equal(a.value(), b.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{node_free, node_insert_child, node_new, node_update_style};
    use crate::native::state::with_state;
    use crate::types::{Edge, FlexDirection};

    #[test]
    fn test_render_nested() {
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();
        node_update_style(root, |style| {
            style.flex_direction = FlexDirection::Row;
            style.width = Value::point(100.0);
            style.margin.set(Edge::Left, Value::point(4.0));
        });

        let options = PrintOptions::STYLE | PrintOptions::CHILDREN;
        let text = with_state(|state| render(state, root, options)).unwrap();
        assert_eq!(
            text,
            concat!(
                "<div style=\"flex-direction: row; width: 100px; margin-left: 4px; \" >\n",
                "  <div style=\"\" ></div>\n",
                "</div>"
            )
        );

        node_free(child);
        node_free(root);
    }

    #[test]
    fn test_render_without_children() {
        let root = node_new();
        let child = node_new();
        node_insert_child(root, child, 0).unwrap();
        let text = with_state(|state| render(state, root, PrintOptions::empty())).unwrap();
        assert_eq!(text, "<div ></div>");
    }
}
