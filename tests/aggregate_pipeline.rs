//! Aggregator wired to mocked segmentation and modeling services.

mod common;

use common::rice_payload;
use grams_estimator::adapters::{HttpFrameEstimator, HttpSegmenter};
use grams_estimator::domain::model::ImageUpload;
use grams_estimator::{Aggregator, GramsError};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        filename: name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        data: name.as_bytes().to_vec(),
    }
}

fn aggregator(segmentation: &MockServer, estimation: &MockServer) -> Aggregator {
    let timeout = Duration::from_secs(5);
    Aggregator::new(
        Arc::new(HttpSegmenter::new(segmentation.base_url(), timeout).unwrap()),
        Arc::new(HttpFrameEstimator::new(estimation.base_url(), timeout).unwrap()),
        3,
    )
}

#[tokio::test]
async fn averages_labels_across_remote_frames() {
    let segmentation = MockServer::start_async().await;
    let estimation = MockServer::start_async().await;

    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze").body_contains("front.jpg");
            then.status(200)
                .json_body(json!({"width": 1000, "height": 800, "segments": []}));
        })
        .await;
    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze").body_contains("side.jpg");
            then.status(200)
                .json_body(json!({"width": 1200, "height": 800, "segments": []}));
        })
        .await;

    estimation
        .mock_async(|when, then| {
            when.method(POST).path("/model").body_contains("\"width\":1000");
            then.status(200).json_body(json!({"results": [
                {"food": "apple", "weight": 100.0, "volume_cm3": 125.0, "calories": 150},
                {"food": "bread", "weight": 40.0, "volume_cm3": 160.0, "calories": 60}
            ]}));
        })
        .await;
    estimation
        .mock_async(|when, then| {
            when.method(POST).path("/model").body_contains("\"width\":1200");
            then.status(200).json_body(json!({"results": [
                {"food": "apple", "weight": 120.0, "volume_cm3": 150.0, "calories": 180}
            ]}));
        })
        .await;

    let report = aggregator(&segmentation, &estimation)
        .aggregate(vec![image("front.jpg"), image("side.jpg")])
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    let apple = report.get("apple").unwrap();
    assert_eq!(apple.weight_g, 110.0);
    assert_eq!(apple.volume_cm3, 137.5);
    assert_eq!(apple.calories, 165);
    let bread = report.get("bread").unwrap();
    assert_eq!(bread.weight_g, 40.0);
    assert_eq!(report.results[0].food, "apple");
}

#[tokio::test]
async fn failed_frames_are_dropped_from_the_mean() {
    let segmentation = MockServer::start_async().await;
    let estimation = MockServer::start_async().await;

    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze").body_contains("good.jpg");
            then.status(200).json_body(rice_payload());
        })
        .await;
    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze").body_contains("blurry.jpg");
            then.status(503);
        })
        .await;
    estimation
        .mock_async(|when, then| {
            when.method(POST).path("/model");
            then.status(200).json_body(json!({"results": [
                {"food": "rice", "weight": 152.06, "volume_cm3": 138.24, "calories": 228}
            ]}));
        })
        .await;

    let report = aggregator(&segmentation, &estimation)
        .aggregate(vec![image("good.jpg"), image("blurry.jpg")])
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].weight_g, 152.06);
    assert_eq!(report.results[0].calories, 228);
}

#[tokio::test]
async fn loosely_typed_remote_results_are_cleaned_before_fusion() {
    let segmentation = MockServer::start_async().await;
    let estimation = MockServer::start_async().await;

    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze");
            then.status(200).json_body(rice_payload());
        })
        .await;
    estimation
        .mock_async(|when, then| {
            when.method(POST).path("/model");
            then.status(200).json_body(json!({"results": [
                {"food": "apple", "weight": 100.0, "volume_cm3": 125.0, "calories": 150.0},
                {"food": "apple", "weight": -100.0, "volume_cm3": -5.0, "calories": 0}
            ]}));
        })
        .await;

    let report = aggregator(&segmentation, &estimation)
        .aggregate(vec![image("a.jpg"), image("b.jpg")])
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    let apple = report.get("apple").unwrap();
    assert_eq!(apple.weight_g, 100.0);
    assert_eq!(apple.volume_cm3, 125.0);
    assert_eq!(apple.calories, 150);
}

#[tokio::test]
async fn estimation_outage_yields_no_usable_input() {
    let segmentation = MockServer::start_async().await;
    let estimation = MockServer::start_async().await;

    segmentation
        .mock_async(|when, then| {
            when.method(POST).path("/analyze");
            then.status(200).json_body(rice_payload());
        })
        .await;
    estimation
        .mock_async(|when, then| {
            when.method(POST).path("/model");
            then.status(502);
        })
        .await;

    let err = aggregator(&segmentation, &estimation)
        .aggregate(vec![image("a.jpg")])
        .await
        .unwrap_err();

    assert!(matches!(err, GramsError::NoUsableInput { attempted: 1 }));
}
