//! CSS generation from a node's raw style bag.
//!
//! Each `convert_*` function handles one style category and returns its
//! declarations in a fixed order. [`generate_css`] concatenates the categories
//! as background, fill, stroke, radius, layout, text, opacity and wraps them in
//! a class block named after the node.
//!
//! Only solid fills and strokes are rendered; gradients and images are skipped.
//! Alignment keywords missing from the lookup tables produce no declaration.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::node::{BoundingBox, Color, Node, Paint};

/// One `property: value;` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

impl Declaration {
    fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {};", self.property, self.value)
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `figma-<id>_<name>_class`; the prefix keeps the class from starting with a digit.
pub fn class_name(id: &str, name: &str) -> String {
    format!(
        "figma-{}_{}_class",
        sanitize_identifier(id),
        sanitize_identifier(name)
    )
}

/// `rgba(r, g, b, a)` with 0–255 channels and the alpha left fractional.
pub fn rgb_to_css(color: &Color) -> String {
    let channel = |v: f64| (v * 255.0).round() as i64;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color.r),
        channel(color.g),
        channel(color.b),
        color.a
    )
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn float(value: &Option<Number>) -> Option<f64> {
    value.as_ref().and_then(Number::as_f64)
}

fn paints(styles: &Node, key: &str) -> Vec<Paint> {
    styles
        .attr(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| Paint::deserialize(entry).ok())
                .collect()
        })
        .unwrap_or_default()
}

pub fn convert_background_color(styles: &Node) -> Vec<Declaration> {
    styles
        .typed::<Color>("backgroundColor")
        .map(|color| Declaration::new("background-color", rgb_to_css(&color)))
        .into_iter()
        .collect()
}

pub fn convert_fills(styles: &Node) -> Vec<Declaration> {
    paints(styles, "fills")
        .iter()
        .filter_map(Paint::solid_color)
        .map(|color| Declaration::new("background", rgb_to_css(&color)))
        .collect()
}

/// Stroke width falls back to 1px when `strokeWeight` is unset.
pub fn convert_strokes(styles: &Node) -> Vec<Declaration> {
    let width = styles.number("strokeWeight").unwrap_or(1.0);
    paints(styles, "strokes")
        .iter()
        .filter_map(Paint::solid_color)
        .map(|color| {
            Declaration::new("border", format!("{} solid {}", px(width), rgb_to_css(&color)))
        })
        .collect()
}

pub fn convert_border_radius(styles: &Node) -> Vec<Declaration> {
    styles
        .number("cornerRadius")
        .map(|radius| Declaration::new("border-radius", px(radius)))
        .into_iter()
        .collect()
}

fn counter_axis_alignment(value: &str) -> Option<&'static str> {
    match value {
        "CENTER" => Some("center"),
        "MIN" => Some("flex-start"),
        "MAX" => Some("flex-end"),
        "BASELINE" => Some("baseline"),
        _ => None,
    }
}

fn primary_axis_alignment(value: &str) -> Option<&'static str> {
    match value {
        "MIN" => Some("flex-start"),
        "CENTER" => Some("center"),
        "MAX" => Some("flex-end"),
        "SPACE_BETWEEN" => Some("space-between"),
        _ => None,
    }
}

fn text_alignment(value: &str) -> Option<&'static str> {
    match value {
        "LEFT" => Some("left"),
        "CENTER" => Some("center"),
        "RIGHT" => Some("right"),
        "JUSTIFIED" => Some("justify"),
        _ => None,
    }
}

/// Size, flex container, padding, gap and alignment, in that order.
pub fn convert_layout(styles: &Node) -> Vec<Declaration> {
    let mut rules = Vec::new();

    if let Some(bounds) = styles.typed::<BoundingBox>("absoluteBoundingBox") {
        if let Some(width) = float(&bounds.width) {
            rules.push(Declaration::new("width", px(width)));
        }
        if let Some(height) = float(&bounds.height) {
            rules.push(Declaration::new("height", px(height)));
        }
    }

    if let Some(mode) = styles.text("layoutMode") {
        rules.push(Declaration::new("display", "flex"));
        match mode {
            "HORIZONTAL" => rules.push(Declaration::new("flex-direction", "row")),
            "VERTICAL" => rules.push(Declaration::new("flex-direction", "column")),
            _ => {}
        }
    }

    for (key, property) in [
        ("paddingLeft", "padding-left"),
        ("paddingRight", "padding-right"),
        ("paddingTop", "padding-top"),
        ("paddingBottom", "padding-bottom"),
        ("itemSpacing", "gap"),
    ] {
        if let Some(value) = styles.number(key) {
            rules.push(Declaration::new(property, px(value)));
        }
    }

    if let Some(align) = styles.text("counterAxisAlignItems").and_then(counter_axis_alignment) {
        rules.push(Declaration::new("align-items", align));
    }
    if let Some(justify) = styles.text("primaryAxisAlignItems").and_then(primary_axis_alignment) {
        rules.push(Declaration::new("justify-content", justify));
    }

    rules
}

pub fn convert_text_style(styles: &Node) -> Vec<Declaration> {
    let Some(text) = styles.text_style() else {
        return Vec::new();
    };
    let mut rules = Vec::new();

    if let Some(family) = &text.font_family {
        rules.push(Declaration::new("font-family", format!("'{family}', sans-serif")));
    }
    if let Some(size) = float(&text.font_size) {
        rules.push(Declaration::new("font-size", px(size)));
    }
    if let Some(weight) = float(&text.font_weight) {
        rules.push(Declaration::new("font-weight", weight.to_string()));
    }
    if let Some(line_height) = float(&text.line_height_px) {
        rules.push(Declaration::new("line-height", px(line_height)));
    }
    if let Some(spacing) = float(&text.letter_spacing) {
        rules.push(Declaration::new("letter-spacing", px(spacing)));
    }
    if let Some(align) = text.text_align_horizontal.as_deref().and_then(text_alignment) {
        rules.push(Declaration::new("text-align", align));
    }

    rules
}

/// Skipped when fully opaque.
pub fn convert_opacity(styles: &Node) -> Vec<Declaration> {
    styles
        .number("opacity")
        .filter(|opacity| *opacity != 1.0)
        .map(|opacity| Declaration::new("opacity", opacity.to_string()))
        .into_iter()
        .collect()
}

/// All declarations for a node in category order.
pub fn generate_declarations(styles: &Node) -> Vec<Declaration> {
    let categories: [fn(&Node) -> Vec<Declaration>; 7] = [
        convert_background_color,
        convert_fills,
        convert_strokes,
        convert_border_radius,
        convert_layout,
        convert_text_style,
        convert_opacity,
    ];
    categories.iter().flat_map(|convert| convert(styles)).collect()
}

/// The class block for one node, without a trailing newline.
pub fn generate_css(id: &str, name: &str, styles: &Node) -> String {
    let mut lines = vec![format!(".{} {{", class_name(id, name))];
    lines.extend(generate_declarations(styles).iter().map(ToString::to_string));
    lines.push("}".to_string());
    lines.join("\n")
}

pub fn generate_css_file_content(id: &str, name: &str, styles: &Node) -> String {
    generate_css_file_content_at(id, name, styles, Utc::now())
}

/// File content with a header comment stamped with `generated_at`.
pub fn generate_css_file_content_at(
    id: &str,
    name: &str,
    styles: &Node,
    generated_at: DateTime<Utc>,
) -> String {
    format!(
        "/**\n * CSS for Figma Node: {name}\n * Node ID: {id}\n * Generated at: {}\n */\n\n{}\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        generate_css(id, name, styles)
    )
}
