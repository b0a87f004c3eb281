//! Checks for the access token, file URL and node id supplied by the user.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

pub const TOKEN_PREFIX: &str = "figd_";
pub const MIN_TOKEN_LEN: usize = 20;

fn file_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://(?:www\.)?figma\.com/(?:file|design)/([a-zA-Z0-9]+)")
            .expect("file URL pattern is valid")
    })
}

fn node_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9:-]+$").expect("node id pattern is valid"))
}

fn node_id_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[?&]node-id=([0-9:-]+)").expect("node-id parameter pattern is valid")
    })
}

fn blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_token(token: Option<&str>) -> Result<(), ValidationError> {
    let token = blank(token).ok_or(ValidationError::MissingToken)?;
    if !token.starts_with(TOKEN_PREFIX) {
        return Err(ValidationError::TokenPrefix);
    }
    if token.len() < MIN_TOKEN_LEN {
        return Err(ValidationError::TokenTooShort);
    }
    Ok(())
}

/// Returns the file id from a `figma.com/file/...` or `figma.com/design/...` URL.
pub fn validate_and_extract_file_id(url: Option<&str>) -> Result<String, ValidationError> {
    let url = blank(url).ok_or(ValidationError::MissingFileUrl)?;
    file_url_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ValidationError::MalformedFileUrl(url.to_string()))
}

/// Accepts ids made of digits, `:` and `-`; `-` is normalized to `:`.
/// An empty or missing id means "no node" and is not an error.
pub fn validate_node_id(node_id: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(node_id) = node_id.filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    if !node_id_pattern().is_match(node_id) {
        return Err(ValidationError::MalformedNodeId(node_id.to_string()));
    }
    Ok(Some(node_id.replace('-', ":")))
}

/// Reads the `node-id` query parameter of a Figma URL, normalized to `:` form.
pub fn extract_node_id_from_url(url: Option<&str>) -> Option<String> {
    node_id_param_pattern()
        .captures(url?)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace('-', ":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rules() {
        assert_eq!(validate_token(None), Err(ValidationError::MissingToken));
        assert_eq!(validate_token(Some("   ")), Err(ValidationError::MissingToken));
        assert_eq!(
            validate_token(Some("abcd_0123456789012345")),
            Err(ValidationError::TokenPrefix)
        );
        assert_eq!(validate_token(Some("figd_short")), Err(ValidationError::TokenTooShort));
        assert_eq!(validate_token(Some("figd_0123456789abcdef")), Ok(()));
    }

    #[test]
    fn file_id_from_file_and_design_urls() {
        let file_url = "https://www.figma.com/file/AbC123/My-File";
        assert_eq!(validate_and_extract_file_id(Some(file_url)).unwrap(), "AbC123");
        let design_url = "https://figma.com/design/XyZ9/Page?node-id=1-2";
        assert_eq!(validate_and_extract_file_id(Some(design_url)).unwrap(), "XyZ9");
    }

    #[test]
    fn malformed_or_missing_file_url() {
        assert_eq!(validate_and_extract_file_id(Some("")), Err(ValidationError::MissingFileUrl));
        assert!(matches!(
            validate_and_extract_file_id(Some("https://example.com/file/abc")),
            Err(ValidationError::MalformedFileUrl(_))
        ));
    }

    #[test]
    fn node_id_normalization() {
        assert_eq!(validate_node_id(None), Ok(None));
        assert_eq!(validate_node_id(Some("")), Ok(None));
        assert_eq!(validate_node_id(Some("12-34")).unwrap().as_deref(), Some("12:34"));
        assert_eq!(validate_node_id(Some("12:34")).unwrap().as_deref(), Some("12:34"));
        assert_eq!(
            validate_node_id(Some("I12:34;5:6")),
            Err(ValidationError::MalformedNodeId("I12:34;5:6".into()))
        );
    }

    #[test]
    fn node_id_from_url_query() {
        let url = "https://www.figma.com/design/AbC123/File?node-id=10-20&t=xyz";
        assert_eq!(extract_node_id_from_url(Some(url)).as_deref(), Some("10:20"));
        assert_eq!(extract_node_id_from_url(Some("https://www.figma.com/file/AbC123/File")), None);
        assert_eq!(extract_node_id_from_url(None), None);
    }
}
