//! Style extraction: a closed-schema, presence-preserving copy of a node tree.
//!
//! Every recognized attribute is read with an explicit presence check and copied
//! only when the source carries it, so `0`, `""` and `false` survive while absent
//! keys stay absent in the serialized snapshot. Keys outside the schema are
//! dropped. Geometry blobs are borrowed from the source document instead of
//! being deep-copied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::node::{BoundingBox, Color, Constraints, Node, Size, StyleReferences, TypeStyle};

/// Normalized styles of one node and its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyleInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    // geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_bounding_box: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_transform: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Number>,

    // background and fills
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_geometry: Option<&'a Value>,

    // strokes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_join: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_miter_limit: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_geometry: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_pattern: Option<Vec<Number>>,

    // corners
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rectangle_corner_radii: Option<Vec<Number>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_smoothing: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<Value>>,

    // opacity and blending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mask: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mask_outline: Option<bool>,

    // text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TypeStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_style_overrides: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_override_table: Option<Map<String, Value>>,

    // auto layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_grow: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_positioning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_axis_align_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_axis_align_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_axis_sizing_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_axis_sizing_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_spacing: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_axis_spacing: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_wrap: Option<String>,

    // sizing constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,

    // clipping and overflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_direction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_grids: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_settings: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    // images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_ratio: Option<bool>,

    // components and instances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_property_references: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<Value>>,

    // prototyping
    #[serde(rename = "transitionNodeID", skip_serializing_if = "Option::is_none")]
    pub transition_node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_easing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleReferences>,

    // vectors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_network: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_mirroring: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_operation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeStyleInfo<'a>>>,
}

/// The raw value under `key`, kept only when it decodes as `T`.
fn shaped<'a, T: Deserialize<'a>>(node: &'a Node, key: &str) -> Option<&'a Value> {
    node.typed::<T>(key).and(node.attr(key))
}

/// Extracts the normalized styles of `node` and, recursively, of all its descendants.
pub fn extract_node_styles(node: &Node) -> NodeStyleInfo<'_> {
    NodeStyleInfo {
        id: node.id.clone(),
        name: node.name.clone(),
        node_type: node.node_type.clone(),

        size: node.typed("size"),
        absolute_bounding_box: node.typed("absoluteBoundingBox"),
        relative_transform: node.attr("relativeTransform"),
        rotation: node.typed("rotation"),

        background_color: shaped::<Color>(node, "backgroundColor"),
        fills: node.typed("fills"),
        fill_geometry: node.attr("fillGeometry"),

        strokes: node.typed("strokes"),
        stroke_weight: node.typed("strokeWeight"),
        stroke_align: node.typed("strokeAlign"),
        stroke_cap: node.typed("strokeCap"),
        stroke_join: node.typed("strokeJoin"),
        stroke_miter_limit: node.typed("strokeMiterLimit"),
        stroke_geometry: node.attr("strokeGeometry"),
        dash_pattern: node.typed("dashPattern"),

        corner_radius: node.typed("cornerRadius"),
        rectangle_corner_radii: node.typed("rectangleCornerRadii"),
        corner_smoothing: node.typed("cornerSmoothing"),

        effects: node.typed("effects"),

        opacity: node.typed("opacity"),
        blend_mode: node.typed("blendMode"),
        is_mask: node.typed("isMask"),
        is_mask_outline: node.typed("isMaskOutline"),

        characters: node.typed("characters"),
        style: node.text_style(),
        character_style_overrides: node.typed("characterStyleOverrides"),
        style_override_table: node.typed("styleOverrideTable"),

        layout_mode: node.typed("layoutMode"),
        layout_align: node.typed("layoutAlign"),
        layout_grow: node.typed("layoutGrow"),
        layout_positioning: node.typed("layoutPositioning"),
        primary_axis_align_items: node.typed("primaryAxisAlignItems"),
        counter_axis_align_items: node.typed("counterAxisAlignItems"),
        primary_axis_sizing_mode: node.typed("primaryAxisSizingMode"),
        counter_axis_sizing_mode: node.typed("counterAxisSizingMode"),
        padding_left: node.typed("paddingLeft"),
        padding_right: node.typed("paddingRight"),
        padding_top: node.typed("paddingTop"),
        padding_bottom: node.typed("paddingBottom"),
        item_spacing: node.typed("itemSpacing"),
        counter_axis_spacing: node.typed("counterAxisSpacing"),
        layout_wrap: node.typed("layoutWrap"),

        min_width: node.typed("minWidth"),
        max_width: node.typed("maxWidth"),
        min_height: node.typed("minHeight"),
        max_height: node.typed("maxHeight"),

        constraints: node.typed("constraints"),

        clips_content: node.typed("clipsContent"),
        overflow_direction: node.typed("overflowDirection"),

        layout_grids: node.typed("layoutGrids"),
        export_settings: node.typed("exportSettings"),

        visible: node.typed("visible"),
        locked: node.typed("locked"),

        image_ref: node.typed("imageRef"),
        preserve_ratio: node.typed("preserveRatio"),

        component_id: node.typed("componentId"),
        component_properties: node.typed("componentProperties"),
        component_property_references: node.typed("componentPropertyReferences"),
        overrides: node.typed("overrides"),

        transition_node_id: node.typed("transitionNodeID"),
        transition_duration: node.typed("transitionDuration"),
        transition_easing: node.typed("transitionEasing"),
        reactions: node.typed("reactions"),

        styles: node.typed("styles"),

        vector_network: node.attr("vectorNetwork"),
        handle_mirroring: node.typed("handleMirroring"),

        boolean_operation: node.typed("booleanOperation"),

        children: node
            .children
            .as_ref()
            .map(|children| children.iter().map(extract_node_styles).collect()),
    }
}

/// Normalized document styles plus the file-level component and style dictionaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStyles<'a> {
    pub document_styles: NodeStyleInfo<'a>,
    pub components: Map<String, Value>,
    pub styles: Map<String, Value>,
}

pub fn extract_file_styles<'a>(
    document: &'a Node,
    components: Option<&Map<String, Value>>,
    styles: Option<&Map<String, Value>>,
) -> FileStyles<'a> {
    FileStyles {
        document_styles: extract_node_styles(document),
        components: components.cloned().unwrap_or_default(),
        styles: styles.cloned().unwrap_or_default(),
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
    fn falsy_values_are_preserved() {
        let source = node(json!({
            "id": "1:1", "name": "Box", "type": "RECTANGLE",
            "cornerRadius": 0, "opacity": 0, "characters": "", "visible": false,
            "clipsContent": false, "paddingLeft": 0, "itemSpacing": 0
        }));
        let info = extract_node_styles(&source);
        assert_eq!(info.corner_radius, Some(Number::from(0)));
        assert_eq!(info.opacity, Some(Number::from(0)));
        assert_eq!(info.characters.as_deref(), Some(""));
        assert_eq!(info.visible, Some(false));
        assert_eq!(info.clips_content, Some(false));
        assert_eq!(info.padding_left, Some(Number::from(0)));
        assert_eq!(info.item_spacing, Some(Number::from(0)));
    }

    #[test]
    fn absent_keys_are_not_serialized() {
        let source = node(json!({"id": "1:1", "name": "Empty", "type": "FRAME"}));
        let json = serde_json::to_value(extract_node_styles(&source)).unwrap();
        assert_eq!(json, json!({"id": "1:1", "name": "Empty", "type": "FRAME"}));
    }

    #[test]
    fn unrecognized_keys_are_dropped() {
        let source = node(json!({
            "id": "1:1", "name": "A",
            "pluginData": {"x": 1}, "scrollBehavior": "SCROLLS"
        }));
        let json = serde_json::to_value(extract_node_styles(&source)).unwrap();
        assert!(json.get("pluginData").is_none());
        assert!(json.get("scrollBehavior").is_none());
    }

    #[test]
    fn children_keep_shape_and_order() {
        let source = node(json!({
            "id": "0:1", "name": "Root",
            "children": [
                {"id": "1:1", "name": "First", "children": [
                    {"id": "2:1", "name": "Deep", "opacity": 0.5}
                ]},
                {"id": "1:2", "name": "Second"}
            ]
        }));
        let info = extract_node_styles(&source);
        let children = info.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name.as_deref(), Some("First"));
        assert_eq!(children[1].name.as_deref(), Some("Second"));
        assert!(children[1].children.is_none());
        let deep = &children[0].children.as_ref().unwrap()[0];
        assert_eq!(deep.opacity, Number::from_f64(0.5));
    }

    #[test]
    fn opaque_blobs_are_borrowed_verbatim() {
        let source = node(json!({
            "id": "3:3", "name": "Vector",
            "vectorNetwork": {"vertices": [{"x": 0, "y": 0}], "segments": []},
            "fillGeometry": [{"path": "M0 0L1 1", "windingRule": "NONZERO"}]
        }));
        let info = extract_node_styles(&source);
        assert!(std::ptr::eq(info.vector_network.unwrap(), source.attr("vectorNetwork").unwrap()));
        assert_eq!(info.fill_geometry, source.attr("fillGeometry"));
    }

    #[test]
    fn composite_attributes_copy_known_subfields() {
        let source = node(json!({
            "id": "4:4", "name": "Label",
            "constraints": {"horizontal": "LEFT", "vertical": "TOP", "extra": 1},
            "styles": {"fill": "S:1", "text": "S:2"},
            "style": {"fontFamily": "Inter", "fontWeight": 700, "letterSpacing": 0}
        }));
        let json = serde_json::to_value(extract_node_styles(&source)).unwrap();
        assert_eq!(json["constraints"], json!({"horizontal": "LEFT", "vertical": "TOP"}));
        assert_eq!(json["styles"], json!({"fill": "S:1", "text": "S:2"}));
        assert_eq!(
            json["style"],
            json!({"fontFamily": "Inter", "fontWeight": 700, "letterSpacing": 0})
        );
    }

    #[test]
    fn numbers_keep_their_source_text() {
        let source = node(json!({
            "id": "5:5", "name": "Chip",
            "cornerRadius": 8, "strokeWeight": 1.5, "rectangleCornerRadii": [0, 4, 4, 0],
            "backgroundColor": {"r": 1, "g": 1, "b": 1, "a": 1},
            "absoluteBoundingBox": {"x": 0, "y": 10, "width": 64, "height": 32},
            "style": {"fontSize": 12, "fontWeight": 700}
        }));
        let text = serde_json::to_string(&extract_node_styles(&source)).unwrap();
        assert!(text.contains(r#""cornerRadius":8,"#), "{text}");
        assert!(text.contains(r#""strokeWeight":1.5"#), "{text}");
        assert!(text.contains(r#""rectangleCornerRadii":[0,4,4,0]"#), "{text}");
        let bounds = r#""absoluteBoundingBox":{"x":0,"y":10,"width":64,"height":32}"#;
        assert!(text.contains(bounds), "{text}");
        assert!(text.contains(r#""style":{"fontSize":12,"fontWeight":700}"#), "{text}");
        assert!(!text.contains(".0"), "{text}");
    }

    #[test]
    fn malformed_background_color_is_dropped() {
        let source = node(json!({"id": "6:6", "name": "Bad", "backgroundColor": {"r": "red"}}));
        assert!(extract_node_styles(&source).background_color.is_none());
    }

    #[test]
    fn file_styles_default_to_empty_dictionaries() {
        let document = node(json!({"id": "0:0", "name": "Document", "type": "DOCUMENT"}));
        let components: Map<String, Value> =
            json!({"1:5": {"name": "Button"}}).as_object().cloned().unwrap();
        let file = extract_file_styles(&document, Some(&components), None);
        assert_eq!(file.components.len(), 1);
        assert!(file.styles.is_empty());
        assert_eq!(file.document_styles.name.as_deref(), Some("Document"));
    }
}
