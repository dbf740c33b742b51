//! Geometry image reference derived from the latest broadcast

use crate::api::BroadcastResponse;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Image path components computed from a broadcast response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryImageRef {
    pub field_type: String,
    /// `None` when the response payload carried no intention
    pub intention_slug: Option<String>,
}

impl GeometryImageRef {
    /// Full image URL under `base`; a missing slug leaves that segment empty
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/static/images/{}_{}.svg",
            base.trim_end_matches('/'),
            self.field_type,
            self.intention_slug.as_deref().unwrap_or_default()
        )
    }

    pub fn alt_text(&self) -> String {
        format!("{} geometry", self.field_type)
    }
}

/// Replace every whitespace run with a single underscore
pub fn slugify(intention: &str) -> String {
    WHITESPACE_RUN.replace_all(intention, "_").into_owned()
}

/// Extract the image reference from a response, if it has a payload with a field type
pub fn geometry_image_ref(response: &BroadcastResponse) -> Option<GeometryImageRef> {
    let field_type = response.payload_field_type()?;

    Some(GeometryImageRef {
        field_type,
        intention_slug: response.payload_intention().map(slugify),
    })
}

/// URL of the geometry image for the latest broadcast, or `None` before any broadcast
///
/// The URL is only handed to the renderer; nothing here fetches it.
pub fn compute_geometry_image_url(base: &str, response: Option<&BroadcastResponse>) -> Option<String> {
    response
        .and_then(geometry_image_ref)
        .map(|image| image.url(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://healing-api.onrender.com";

    fn response(intention: serde_json::Value, field_type: &str) -> BroadcastResponse {
        BroadcastResponse::new(json!({
            "packet": {
                "payload": {
                    "intention": intention,
                    "frequency": 7.83,
                    "field_type": field_type
                }
            },
            "packet_base64": "AAEC"
        }))
    }

    #[test]
    fn test_absent_before_broadcast() {
        assert_eq!(compute_geometry_image_url(BASE, None), None);
    }

    #[test]
    fn test_url_for_intention() {
        let response = response(json!("I am at peace"), "flower_of_life");
        let url = compute_geometry_image_url(BASE, Some(&response)).unwrap();
        assert_eq!(
            url,
            "https://healing-api.onrender.com/static/images/flower_of_life_I_am_at_peace.svg"
        );
        assert!(url.ends_with("flower_of_life_I_am_at_peace.svg"));
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("love   and peace"), "love_and_peace");
        assert_eq!(slugify("tab\tand\nnewline"), "tab_and_newline");
        assert_eq!(slugify(" edges "), "_edges_");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_missing_intention_omits_slug() {
        let response = BroadcastResponse::new(json!({
            "packet": { "payload": { "field_type": "torus" } }
        }));
        let image = geometry_image_ref(&response).unwrap();
        assert_eq!(image.intention_slug, None);
        assert_eq!(image.url(BASE), format!("{}/static/images/torus_.svg", BASE));
        assert_eq!(image.alt_text(), "torus geometry");
    }

    #[test]
    fn test_response_without_packet() {
        let error_body = BroadcastResponse::new(json!({"detail": "Internal Server Error"}));
        assert_eq!(compute_geometry_image_url(BASE, Some(&error_body)), None);
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let response = response(json!("joy"), "sri_yantra");
        assert_eq!(
            compute_geometry_image_url("http://localhost:5000/", Some(&response)).as_deref(),
            Some("http://localhost:5000/static/images/sri_yantra_joy.svg")
        );
    }
}
