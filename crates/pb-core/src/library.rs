//! Static component library: type → {name, icon, category, capability, defaults}.
//!
//! The document model only consumes two things from here: whether a type may
//! own children, and the default props used to instantiate a library item.

use crate::model::{NodeSpec, PropMap};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Palette grouping shown by library panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Layout,
    Basic,
    Form,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Layout,
        Category::Basic,
        Category::Form,
        Category::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Layout => "Layout",
            Category::Basic => "Basic",
            Category::Form => "Form",
            Category::Advanced => "Advanced",
        }
    }
}

/// A draggable library entry.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub category: Category,
    pub allows_children: bool,
    pub default_props: PropMap,
}

impl ComponentDefinition {
    /// A fresh, unplaced node carrying this definition's default props.
    pub fn instantiate(&self) -> NodeSpec {
        let mut spec = NodeSpec::new(self.kind);
        spec.props = self.default_props.clone();
        spec
    }
}

fn def(
    kind: &'static str,
    name: &'static str,
    icon: &'static str,
    category: Category,
    allows_children: bool,
    props: Value,
) -> ComponentDefinition {
    let default_props = match props {
        Value::Object(map) => map,
        _ => PropMap::new(),
    };
    ComponentDefinition {
        kind,
        name,
        icon,
        category,
        allows_children,
        default_props,
    }
}

static CATALOG: LazyLock<Vec<ComponentDefinition>> = LazyLock::new(|| {
    use Category::*;
    vec![
        // Layout
        def("container", "Container", "layout", Layout, true, json!({ "className": "w-full p-4" })),
        def("row", "Row", "layout", Layout, true, json!({ "className": "flex flex-row w-full" })),
        def("column", "Column", "layout", Layout, true, json!({ "className": "flex flex-col" })),
        def(
            "card",
            "Card",
            "square",
            Layout,
            true,
            json!({ "className": "bg-white rounded-lg shadow-sm p-4" }),
        ),
        def("grid", "Grid", "grid", Layout, true, json!({ "className": "grid grid-cols-2 gap-4" })),
        // Basic
        def(
            "text",
            "Text",
            "type",
            Basic,
            false,
            json!({ "content": "Text content", "className": "text-base" }),
        ),
        def(
            "heading",
            "Heading",
            "type",
            Basic,
            false,
            json!({ "content": "Heading", "level": "h2", "className": "text-2xl font-bold" }),
        ),
        def(
            "image",
            "Image",
            "image",
            Basic,
            false,
            json!({
                "src": "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?auto=format&fit=crop&w=500&q=60",
                "alt": "Image",
                "className": "w-full h-auto rounded-md",
            }),
        ),
        def(
            "button",
            "Button",
            "square",
            Basic,
            false,
            json!({
                "content": "Button",
                "className": "px-4 py-2 bg-indigo-600 text-white rounded-md hover:bg-indigo-700",
            }),
        ),
        def(
            "divider",
            "Divider",
            "align-left",
            Basic,
            false,
            json!({ "className": "w-full h-px bg-gray-200 my-4" }),
        ),
        // Form
        def(
            "input",
            "Input",
            "form-input",
            Form,
            false,
            json!({
                "placeholder": "Enter text...",
                "className": "w-full px-3 py-2 border border-gray-300 rounded-md",
            }),
        ),
        def(
            "textarea",
            "Textarea",
            "form-input",
            Form,
            false,
            json!({
                "placeholder": "Enter text...",
                "rows": 4,
                "className": "w-full px-3 py-2 border border-gray-300 rounded-md",
            }),
        ),
        def(
            "checkbox",
            "Checkbox",
            "check-square",
            Form,
            false,
            json!({ "label": "Checkbox", "className": "form-checkbox h-4 w-4 text-indigo-600" }),
        ),
        def(
            "select",
            "Select",
            "form-input",
            Form,
            false,
            json!({
                "options": [
                    { "value": "option1", "label": "Option 1" },
                    { "value": "option2", "label": "Option 2" },
                    { "value": "option3", "label": "Option 3" },
                ],
                "className": "w-full px-3 py-2 border border-gray-300 rounded-md",
            }),
        ),
        // Advanced
        def(
            "navbar",
            "Navbar",
            "layout",
            Advanced,
            true,
            json!({
                "className": "flex items-center justify-between w-full p-4 bg-white shadow-sm",
            }),
        ),
        def(
            "footer",
            "Footer",
            "layout",
            Advanced,
            true,
            json!({ "className": "w-full p-4 bg-gray-100" }),
        ),
        def(
            "list",
            "List",
            "list",
            Advanced,
            false,
            json!({ "items": ["Item 1", "Item 2", "Item 3"], "className": "list-disc pl-5" }),
        ),
        def(
            "chart",
            "Chart",
            "bar-chart",
            Advanced,
            false,
            json!({
                "type": "bar",
                "data": {
                    "labels": ["Jan", "Feb", "Mar", "Apr", "May"],
                    "values": [12, 19, 3, 5, 2],
                },
                "className": "w-full h-64 bg-white p-4 rounded-md",
            }),
        ),
    ]
});

/// All library definitions in palette order.
pub fn catalog() -> &'static [ComponentDefinition] {
    &CATALOG
}

/// Look up a definition by component type.
pub fn definition(kind: &str) -> Option<&'static ComponentDefinition> {
    CATALOG.iter().find(|d| d.kind == kind)
}

/// Whether nodes of `kind` may own children. Unknown types are leaves.
pub fn allows_children(kind: &str) -> bool {
    definition(kind).is_some_and(|d| d.allows_children)
}

/// A fresh node spec for `kind` with its default props.
pub fn instantiate(kind: &str) -> Option<NodeSpec> {
    definition(kind).map(ComponentDefinition::instantiate)
}

/// Definitions of one palette category, in palette order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static ComponentDefinition> {
    CATALOG.iter().filter(move |d| d.category == category)
}
