use crate::config::Config;
use crate::error::GenerateError;
use crate::media::OCTET_STREAM;
use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::Duration;

pub const GENERATE_PATH: &str = "/api/v1/generate";

/// Everything the backend needs for one generation
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub image: Arc<[u8]>,
    pub file_name: String,
    pub media_type: String,
    pub prompt: String,
}

/// Raw bytes returned by a successful call
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

#[derive(Clone)]
pub struct GenerateClient {
    client: Client,
    endpoint: String,
}

impl GenerateClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint_url(base_url),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint_url(&config.endpoint()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedImage, GenerateError> {
        let image = Part::bytes(request.image.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.media_type)?;
        let form = Form::new()
            .part("image", image)
            .text("prompt", request.prompt.clone());

        tracing::info!(
            endpoint = %self.endpoint,
            file = %request.file_name,
            size = request.image.len(),
            "sending generation request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let media_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| OCTET_STREAM.to_string());
        let bytes = response.bytes().await?.to_vec();

        tracing::info!(size = bytes.len(), %media_type, "generation succeeded");
        Ok(GeneratedImage { bytes, media_type })
    }
}

fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH)
}
