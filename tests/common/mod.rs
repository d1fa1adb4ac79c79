#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use grams_estimator::ServiceConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const BOUNDARY: &str = "grams-test-boundary";

/// Config with a fixed density table and in-process estimation.
pub fn test_config(segmentation_url: &str) -> ServiceConfig {
    ServiceConfig::from_toml_str(&format!(
        r#"
[upstream]
segmentation_url = "{segmentation_url}"
estimation_url = ""
timeout_seconds = 5

[density]
default = 1.0
rice = 1.1
apple = 0.8
"#
    ))
    .unwrap()
}

/// Plate of 500 px across plus a rice triangle of 20000 px².
pub fn rice_payload() -> Value {
    json!({
        "width": 1000,
        "height": 1000,
        "segments": [
            {"class_name": "plate", "polygon": [[100, 100], [600, 100], [600, 600], [100, 600]], "confidence": 0.97},
            {"class_name": "rice", "polygon": [[100, 100], [300, 100], [200, 300]], "confidence": 0.88}
        ]
    })
}

pub fn multipart_body(field: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, data) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_images(app: Router, files: &[(&str, &[u8])]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/calculate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("images", files)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
