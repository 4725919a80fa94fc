//! Thin HTTP client for the ImgBB upload endpoint.
//!
//! `upload_image` posts raw image bytes (base64-encoded, as the API expects)
//! and returns the public URL ImgBB assigns to the upload.
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ImgbbClient {
    client: Client,
    upload_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<UploadData>,
    #[serde(default)]
    pub error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
pub struct UploadData {
    pub url: String,
    #[serde(default)]
    pub display_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadError {
    #[serde(default)]
    pub message: Option<String>,
}

impl ImgbbClient {
    pub fn new(upload_url: String, api_key: String) -> Self {
        let upload_url = upload_url.trim_end_matches('/').to_string();
        ImgbbClient { client: Client::new(), upload_url, api_key }
    }

    /// Upload image bytes and return the hosted URL.
    ///
    /// The payload is sent as a form with the API key and the base64-encoded
    /// image, matching ImgBB's upload contract.
    pub async fn upload_image(&self, bytes: &[u8]) -> AppResult<String> {
        let encoded = BASE64.encode(bytes);
        let params = [("key", self.api_key.as_str()), ("image", encoded.as_str())];

        tracing::debug!("Uploading {} bytes to {}", bytes.len(), self.upload_url);
        let response = self.client.post(&self.upload_url)
            .form(&params)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_message = format!("Image host rejected upload. Status: {}, Body: {}", status, error_body);
            tracing::error!("{}", error_message);
            return Err(AppError::Upstream(error_message));
        }

        let body: UploadResponse = response.json().await.map_err(AppError::HttpClient)?;
        let url = hosted_url(body)?;
        tracing::info!("Image hosted at {}", url);
        Ok(url)
    }
}

fn hosted_url(body: UploadResponse) -> AppResult<String> {
    if !body.success {
        let message = body.error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(AppError::Upstream(format!("Image host reported failure: {}", message)));
    }
    body.data
        .map(|d| d.url)
        .ok_or_else(|| AppError::Upstream("Image host response missing data.url".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_response_yields_url() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"success": true, "data": {"url": "https://i.ibb.co/abc/person.jpg", "display_url": "https://ibb.co/abc"}}"#,
        )
        .unwrap();
        assert_eq!(hosted_url(body).unwrap(), "https://i.ibb.co/abc/person.jpg");
    }

    #[test]
    fn reported_failure_surfaces_message() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"success": false, "error": {"message": "Invalid API key"}}"#,
        )
        .unwrap();
        let err = hosted_url(body).unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn missing_data_is_an_upstream_error() {
        let body: UploadResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(hosted_url(body).is_err());
    }
}
