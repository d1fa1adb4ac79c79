use crate::domain::model::{FrameReport, ImageUpload, SegmentationPayload};
use crate::domain::ports::{FrameEstimator, Segmenter};
use crate::utils::error::{GramsError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;

const SEGMENTATION: &str = "segmentation";
const ESTIMATION: &str = "estimation";

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("{} service responded with {}", service, status);
    if status.is_success() {
        Ok(response)
    } else {
        Err(GramsError::upstream(service, format!("HTTP {}", status)))
    }
}

/// Client for the segmentation service (`POST /analyze`, multipart `image`).
#[derive(Debug, Clone)]
pub struct HttpSegmenter {
    client: Client,
    base_url: String,
}

impl HttpSegmenter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Segmenter for HttpSegmenter {
    async fn segment(&self, image: &ImageUpload) -> Result<SegmentationPayload> {
        let url = endpoint(&self.base_url, "analyze");
        tracing::debug!("Sending {} ({} bytes) to {}", image.filename, image.data.len(), url);

        let mut part = Part::bytes(image.data.clone()).file_name(image.filename.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type).map_err(|_| {
                GramsError::invalid_input(format!("invalid content type '{}'", content_type))
            })?;
        }
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GramsError::upstream(SEGMENTATION, e))?;

        ensure_success(SEGMENTATION, response)
            .await?
            .json::<SegmentationPayload>()
            .await
            .map_err(|e| GramsError::upstream(SEGMENTATION, format!("invalid response: {}", e)))
    }
}

/// Client for a remote modeling service (`POST /model`, JSON body).
#[derive(Debug, Clone)]
pub struct HttpFrameEstimator {
    client: Client,
    base_url: String,
}

impl HttpFrameEstimator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FrameEstimator for HttpFrameEstimator {
    async fn estimate(&self, payload: &SegmentationPayload) -> Result<FrameReport> {
        let url = endpoint(&self.base_url, "model");
        tracing::debug!(
            "Sending {} segment(s) to {}",
            payload.segments.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| GramsError::upstream(ESTIMATION, e))?;

        let mut report = ensure_success(ESTIMATION, response)
            .await?
            .json::<FrameReport>()
            .await
            .map_err(|e| GramsError::upstream(ESTIMATION, format!("invalid response: {}", e)))?;

        let dropped = report.drop_invalid_items();
        if dropped > 0 {
            tracing::warn!("{} service returned {} invalid item(s)", ESTIMATION, dropped);
        }
        Ok(report)
    }
}
