//! Response envelopes of the storefront backend
//!
//! Mutating endpoints answer `{ success, description | data }` or
//! `{ success: false, message | error }`, whatever the HTTP status. The
//! listing endpoint answers `{ data: [...] }` or `{ error }`.

use super::error::ClientError;
use crate::items::{ItemId, RawListing};
use serde::{Deserialize, Serialize};

/// `POST /api/generate` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub selected_resources: Vec<ItemId>,
}

impl GenerateRequest {
    #[must_use]
    pub fn single(item: ItemId) -> Self {
        Self {
            selected_resources: vec![item],
        }
    }
}

/// `POST /api/update` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest<'a> {
    pub description: &'a str,
    pub product_id: ItemId,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl Envelope {
    fn parse(status: u16, body: &str) -> Result<Self, ClientError> {
        match serde_json::from_str::<Self>(body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !is_success(status) => Err(status_error(status, body)),
            Err(err) => Err(err.into()),
        }
    }

    fn into_result(self, status: u16) -> Result<Self, ClientError> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .message
            .or(self.error)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Err(ClientError::Rejected(message))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_error(status: u16, body: &str) -> ClientError {
    ClientError::Status {
        status,
        body: body.trim().to_string(),
    }
}

/// Decode a `POST /api/generate` response into the generated text
///
/// # Errors
///
/// Returns `ClientError::Rejected` for `success: false`, or a decode/status
/// error when the body is not an envelope.
pub fn parse_generate(status: u16, body: &str) -> Result<String, ClientError> {
    let envelope = Envelope::parse(status, body)?.into_result(status)?;
    envelope
        .description
        .ok_or_else(|| ClientError::Decode("missing description".to_string()))
}

/// Decode a `POST /api/update` response
///
/// # Errors
///
/// Same as [`parse_generate`].
pub fn parse_apply(status: u16, body: &str) -> Result<(), ClientError> {
    Envelope::parse(status, body)?.into_result(status).map(|_| ())
}

/// Decode a `GET /api/products` response
///
/// # Errors
///
/// Returns `ClientError::Rejected` with the backend's `error` text for a
/// failed fetch, or a decode/status error for anything unreadable.
pub fn parse_listing(status: u16, body: &str) -> Result<RawListing, ClientError> {
    if !is_success(status) {
        return match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope {
                error: Some(message), ..
            }) => Err(ClientError::Rejected(message)),
            _ => Err(status_error(status, body)),
        };
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies() {
        let generate = serde_json::to_value(GenerateRequest::single(ItemId(42))).unwrap();
        assert_eq!(generate, serde_json::json!({ "selectedResources": [42] }));

        let update = serde_json::to_value(UpdateRequest {
            description: "Y",
            product_id: ItemId(42),
        })
        .unwrap();
        assert_eq!(update, serde_json::json!({ "description": "Y", "productId": 42 }));
    }

    #[test]
    fn test_parse_generate_success() {
        let text = parse_generate(200, r#"{"success":true,"description":"X"}"#).unwrap();
        assert_eq!(text, "X");
    }

    #[test]
    fn test_parse_generate_failures() {
        let err = parse_generate(400, r#"{"success":false,"message":"No resources selected"}"#).unwrap_err();
        assert_eq!(err.to_string(), "No resources selected");

        let err = parse_generate(500, r#"{"success":false,"error":"rate limited"}"#).unwrap_err();
        assert_eq!(err.to_string(), "rate limited");

        let err = parse_generate(200, r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));

        let err = parse_generate(502, "<html>Bad gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 502, .. }));
    }

    #[test]
    fn test_parse_apply() {
        assert!(parse_apply(200, r#"{"success":true,"data":{"id":1}}"#).is_ok());
        let err = parse_apply(400, r#"{"success":false,"message":"Description is required"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Description is required");
    }

    #[test]
    fn test_parse_listing() {
        let body = r#"{"data":[{"id":1,"title":"Cap","status":"active","product_type":"Hats",
            "variants":[{"price":"5.00","inventory_quantity":2}]}]}"#;
        let listing = parse_listing(200, body).unwrap();
        assert_eq!(listing.data.len(), 1);
        assert_eq!(listing.data[0].title, "Cap");

        let err = parse_listing(500, r#"{"error":"session expired"}"#).unwrap_err();
        assert_eq!(err.to_string(), "session expired");

        assert!(matches!(parse_listing(200, "not json"), Err(ClientError::Decode(_))));
    }
}
