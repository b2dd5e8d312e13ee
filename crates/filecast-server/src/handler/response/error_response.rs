use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body of an error response.
///
/// Browsers and scripts read the `err` key (`{"err": "No files exist"}`);
/// the remaining fields are diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorResponse<'a> {
    #[serde(rename = "err")]
    pub message: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() -> anyhow::Result<()> {
        let body = ErrorResponse {
            message: "Not an image",
            name: "not_an_image",
            resource: None,
            context: None,
        };

        let json = serde_json::to_value(body)?;
        assert_eq!(json, serde_json::json!({"err": "Not an image", "name": "not_an_image"}));
        Ok(())
    }
}
