//! Code export: Document → HTML page or React (JSX) component.
//!
//! Read-only consumer of the document. Walks roots in sibling order and
//! recurses through `children()`, so the emitted markup mirrors the tree.
//! Kinds without a markup mapping are emitted as comments.

use crate::css::inline_css;
use crate::id::NodeId;
use crate::model::{ComponentInstance, Document};
use serde_json::Value;
use std::fmt::Write;
use v_htmlescape::escape;

// ─── Config ──────────────────────────────────────────────────────────────

/// Configuration for `emit_html` / `emit_jsx`.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Spaces per nesting level. Default: **2**.
    pub indent: usize,
    /// `<title>` of the HTML page.
    pub title: String,
    /// Function name of the generated React component.
    pub component_name: String,
    /// Stylesheet linked from the HTML `<head>`; `None` links nothing.
    pub stylesheet: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            title: "Exported Design".into(),
            component_name: "MyComponent".into(),
            stylesheet: Some(
                "https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css".into(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Html,
    Jsx,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Emit a standalone HTML page.
#[must_use]
pub fn emit_html(doc: &Document, config: &ExportConfig) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(out, "  <title>{}</title>", escape(&config.title));
    if let Some(href) = &config.stylesheet {
        let _ = writeln!(out, "  <link href=\"{}\" rel=\"stylesheet\">", escape(href));
    }
    out.push_str("</head>\n<body>\n");
    emit_roots(&mut out, doc, config, Flavor::Html, 1);
    out.push_str("</body>\n</html>\n");
    out
}

/// Emit a React function component returning the design as JSX.
#[must_use]
pub fn emit_jsx(doc: &Document, config: &ExportConfig) -> String {
    let name = &config.component_name;
    let mut out = String::with_capacity(1024);
    out.push_str("import React from 'react';\n\n");
    let _ = writeln!(out, "function {name}() {{");
    out.push_str("  return (\n    <>\n");
    emit_roots(&mut out, doc, config, Flavor::Jsx, 3);
    out.push_str("    </>\n  );\n}\n\n");
    let _ = writeln!(out, "export default {name};");
    out
}

// ─── Walk ────────────────────────────────────────────────────────────────

fn emit_roots(
    out: &mut String,
    doc: &Document,
    config: &ExportConfig,
    flavor: Flavor,
    depth: usize,
) {
    for root in doc.roots() {
        emit_node(out, doc, root, config, flavor, depth);
    }
}

fn indent(out: &mut String, config: &ExportConfig, depth: usize) {
    for _ in 0..depth * config.indent {
        out.push(' ');
    }
}

fn emit_node(
    out: &mut String,
    doc: &Document,
    node: &ComponentInstance,
    config: &ExportConfig,
    flavor: Flavor,
    depth: usize,
) {
    indent(out, config, depth);
    let attrs = common_attrs(node, flavor);

    if node.allows_children() {
        let tag = match node.kind.as_str() {
            "navbar" => "nav",
            "footer" => "footer",
            _ => "div",
        };
        let children: Vec<NodeId> = doc.child_ids(node.id);
        if children.is_empty() {
            let _ = writeln!(out, "<{tag}{attrs}></{tag}>");
            return;
        }
        let _ = writeln!(out, "<{tag}{attrs}>");
        for child in children {
            if let Some(child) = doc.get(child) {
                emit_node(out, doc, child, config, flavor, depth + 1);
            }
        }
        indent(out, config, depth);
        let _ = writeln!(out, "</{tag}>");
        return;
    }

    let content = text(node.prop_str("content").unwrap_or_default(), flavor);
    match node.kind.as_str() {
        "text" => {
            let _ = writeln!(out, "<p{attrs}>{content}</p>");
        }
        "heading" => {
            let level = match node.prop_str("level") {
                Some(l @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => l,
                _ => "h2",
            };
            let _ = writeln!(out, "<{level}{attrs}>{content}</{level}>");
        }
        "button" => {
            let _ = writeln!(out, "<button{attrs}>{content}</button>");
        }
        "image" => {
            let src = attr_value(node.prop_str("src").unwrap_or_default());
            let alt = attr_value(node.prop_str("alt").unwrap_or_default());
            let _ = writeln!(out, "<img src=\"{src}\" alt=\"{alt}\"{attrs} />");
        }
        "divider" => {
            let _ = writeln!(out, "<hr{attrs} />");
        }
        "input" => {
            let placeholder = attr_value(node.prop_str("placeholder").unwrap_or_default());
            let _ = writeln!(out, "<input type=\"text\" placeholder=\"{placeholder}\"{attrs} />");
        }
        "textarea" => {
            let placeholder = attr_value(node.prop_str("placeholder").unwrap_or_default());
            let rows = node.props.get("rows").and_then(Value::as_u64).unwrap_or(4);
            let _ = writeln!(
                out,
                "<textarea rows=\"{rows}\" placeholder=\"{placeholder}\"{attrs}></textarea>"
            );
        }
        "checkbox" => {
            let label = text(node.prop_str("label").unwrap_or_default(), flavor);
            let _ = writeln!(out, "<label><input type=\"checkbox\"{attrs} /> {label}</label>");
        }
        "select" => emit_select(out, node, config, flavor, depth, &attrs),
        "list" => emit_list(out, node, config, flavor, depth, &attrs),
        other => {
            let note = format!("Component type {other} not supported");
            match flavor {
                Flavor::Html => {
                    let _ = writeln!(out, "<!-- {note} -->");
                }
                Flavor::Jsx => {
                    let _ = writeln!(out, "{{/* {note} */}}");
                }
            }
        }
    }
}

fn emit_select(
    out: &mut String,
    node: &ComponentInstance,
    config: &ExportConfig,
    flavor: Flavor,
    depth: usize,
    attrs: &str,
) {
    let _ = writeln!(out, "<select{attrs}>");
    let options = node.props.get("options").and_then(Value::as_array);
    for option in options.into_iter().flatten() {
        let value = option.get("value").and_then(Value::as_str).unwrap_or_default();
        let label = option.get("label").and_then(Value::as_str).unwrap_or(value);
        indent(out, config, depth + 1);
        let _ = writeln!(
            out,
            "<option value=\"{}\">{}</option>",
            attr_value(value),
            text(label, flavor)
        );
    }
    indent(out, config, depth);
    out.push_str("</select>\n");
}

fn emit_list(
    out: &mut String,
    node: &ComponentInstance,
    config: &ExportConfig,
    flavor: Flavor,
    depth: usize,
    attrs: &str,
) {
    let _ = writeln!(out, "<ul{attrs}>");
    let items = node.props.get("items").and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let label = match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        indent(out, config, depth + 1);
        let _ = writeln!(out, "<li>{}</li>", text(&label, flavor));
    }
    indent(out, config, depth);
    out.push_str("</ul>\n");
}

// ─── Attributes & escaping ───────────────────────────────────────────────

/// ` class="..." style="..."` (HTML) or ` className="..." style={{...}}` (JSX).
fn common_attrs(node: &ComponentInstance, flavor: Flavor) -> String {
    let mut attrs = String::new();
    if let Some(class) = node.prop_str("className").filter(|c| !c.is_empty()) {
        let name = match flavor {
            Flavor::Html => "class",
            Flavor::Jsx => "className",
        };
        let _ = write!(attrs, " {name}=\"{}\"", attr_value(class));
    }
    if !node.style.is_empty() {
        match flavor {
            Flavor::Html => {
                let css = inline_css(&node.style);
                if !css.is_empty() {
                    let _ = write!(attrs, " style=\"{}\"", attr_value(&css));
                }
            }
            Flavor::Jsx => {
                if let Ok(object) = serde_json::to_string(&node.style) {
                    let _ = write!(attrs, " style={{{object}}}");
                }
            }
        }
    }
    attrs
}

fn attr_value(s: &str) -> String {
    escape(s).to_string()
}

fn text(s: &str, flavor: Flavor) -> String {
    let escaped = escape(s).to_string();
    match flavor {
        Flavor::Html => escaped,
        Flavor::Jsx => escaped.replace('{', "&#123;").replace('}', "&#125;"),
    }
}
