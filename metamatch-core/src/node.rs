//! Raw Figma document model.
//!
//! A [`Node`] keeps `id`, `name`, `type` and `children` typed and every other key
//! verbatim in [`Node::attributes`]. Style categories are read through the typed
//! presence helpers ([`Node::attr`], [`Node::typed`]) so that a key counts as set
//! whenever it exists with a non-null value, including `0`, `""` and `false`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// One element of a Figma document tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    /// Every other key of the source object.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    /// Raw value of a style key. A JSON `null` reads as absent.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Style key decoded into `T`. A value of the wrong shape reads as absent.
    pub fn typed<'a, T: Deserialize<'a>>(&'a self, key: &str) -> Option<T> {
        typed_field(&self.attributes, key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.attr(key).and_then(Value::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Both `id` and `name` are set and non-empty.
    pub fn has_identity(&self) -> bool {
        matches!(
            (self.id.as_deref(), self.name.as_deref()),
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty()
        )
    }

    /// The text-style bag (`style`), decoded field by field.
    pub fn text_style(&self) -> Option<TypeStyle> {
        self.attr("style")
            .and_then(Value::as_object)
            .map(TypeStyle::from_map)
    }

    /// Number of nodes in the subtree rooted here, this node included.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }
}

/// Parses JSON with no nesting limit, growing the stack as needed.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

pub(crate) fn typed_field<'a, T: Deserialize<'a>>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!(key, error = %e, "Ignoring attribute with unexpected shape");
            None
        }
    }
}

/// RGBA color with 0–1 channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

/// The part of a fill or stroke entry the CSS generator understands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub color: Option<Color>,
}

impl Paint {
    pub const SOLID: &'static str = "SOLID";

    /// Color of a solid paint; `None` for gradients, images and colorless entries.
    pub fn solid_color(&self) -> Option<Color> {
        if self.kind == Self::SOLID {
            self.color
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
}

/// Horizontal and vertical resize constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

/// Ids of shared styles applied to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleReferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
}

/// Typography of a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_post_script_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height_px: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height_percent: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height_percent_font_size: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align_vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_indent: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_spacing: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_auto_resize: Option<String>,
}

impl TypeStyle {
    /// Copies each recognized key that is present; anything else in the bag is ignored.
    pub fn from_map(style: &Map<String, Value>) -> Self {
        TypeStyle {
            font_family: typed_field(style, "fontFamily"),
            font_post_script_name: typed_field(style, "fontPostScriptName"),
            font_size: typed_field(style, "fontSize"),
            font_weight: typed_field(style, "fontWeight"),
            letter_spacing: typed_field(style, "letterSpacing"),
            line_height_px: typed_field(style, "lineHeightPx"),
            line_height_percent: typed_field(style, "lineHeightPercent"),
            line_height_percent_font_size: typed_field(style, "lineHeightPercentFontSize"),
            line_height_unit: typed_field(style, "lineHeightUnit"),
            text_align_horizontal: typed_field(style, "textAlignHorizontal"),
            text_align_vertical: typed_field(style, "textAlignVertical"),
            text_case: typed_field(style, "textCase"),
            text_decoration: typed_field(style, "textDecoration"),
            paragraph_indent: typed_field(style, "paragraphIndent"),
            paragraph_spacing: typed_field(style, "paragraphSpacing"),
            text_auto_resize: typed_field(style, "textAutoResize"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Node {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_keys_land_in_attributes() {
        let n = node(json!({"id": "1:2", "name": "Frame", "type": "FRAME", "cornerRadius": 4}));
        assert_eq!(n.id.as_deref(), Some("1:2"));
        assert_eq!(n.node_type.as_deref(), Some("FRAME"));
        assert_eq!(n.number("cornerRadius"), Some(4.0));
        assert!(n.children.is_none());
        assert!(n.children().is_empty());
    }

    #[test]
    fn falsy_values_count_as_present_but_null_does_not() {
        let n = node(json!({"opacity": 0, "characters": "", "visible": false, "imageRef": null}));
        assert_eq!(n.typed::<f64>("opacity"), Some(0.0));
        assert_eq!(n.typed::<String>("characters").as_deref(), Some(""));
        assert_eq!(n.typed::<bool>("visible"), Some(false));
        assert!(n.attr("imageRef").is_none());
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let n = node(json!({"cornerRadius": "round"}));
        assert_eq!(n.typed::<f64>("cornerRadius"), None);
        assert!(n.attr("cornerRadius").is_some());
    }

    #[test]
    fn identity_requires_non_empty_id_and_name() {
        assert!(node(json!({"id": "1:1", "name": "A"})).has_identity());
        assert!(!node(json!({"id": "1:1"})).has_identity());
        assert!(!node(json!({"id": "", "name": "A"})).has_identity());
    }

    #[test]
    fn text_style_copies_recognized_fields_only() {
        let n = node(json!({"style": {"fontFamily": "Inter", "fontSize": 0, "futureKey": true}}));
        let style = n.text_style().unwrap();
        assert_eq!(style.font_family.as_deref(), Some("Inter"));
        assert_eq!(style.font_size, Some(Number::from(0)));
        assert_eq!(style.font_weight, None);
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json.to_string(), r#"{"fontFamily":"Inter","fontSize":0}"#);
    }

    #[test]
    fn solid_color_only_for_solid_paints() {
        let solid: Paint = serde_json::from_value(json!({
            "type": "SOLID",
            "color": {"r": 1, "g": 0, "b": 0, "a": 0.5}
        }))
        .unwrap();
        let gradient: Paint = serde_json::from_value(json!({"type": "GRADIENT_LINEAR"})).unwrap();
        assert_eq!(solid.solid_color().map(|c| c.a), Some(0.5));
        assert_eq!(gradient.solid_color(), None);
    }

    #[test]
    fn subtree_len_counts_every_node() {
        let n = node(json!({
            "id": "0:1",
            "children": [{"id": "1:1", "children": [{}]}, {"id": "1:2"}]
        }));
        assert_eq!(n.subtree_len(), 4);
    }
}
