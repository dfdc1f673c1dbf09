//! Test Helper Utilities
//!
//! Shared utilities for testing cmap-review

#![allow(dead_code)]

pub mod log_capture;
pub mod stub_service;

pub use log_capture::{capture_logs, LogCapture};
pub use stub_service::{unreachable_url, RecordedUpload, Reply, StubService};

use cmap_common::config::ServiceConfig;
use cmap_review::{ReviewClient, SelectedFile};
use serde_json::{json, Value};

/// Client pointed at `base_url`
pub fn client_for(base_url: &str) -> ReviewClient {
    ReviewClient::new(ServiceConfig::new(base_url).unwrap()).unwrap()
}

pub fn csv_file() -> SelectedFile {
    SelectedFile::from_bytes("pessoas.csv", b"Nome,Interesses\nAna,Musica\n".to_vec())
}

/// Two communities over Ana, Bruno, Carla, Davi, Eva and Fabio
pub fn grouping() -> Value {
    json!({
        "communities": [
            {
                "id": 0,
                "members": ["Ana", "Bruno", "Carla"],
                "shared_categories": [
                    {"category": "Cinema", "people": 2, "percentage": 66.66666666666667}
                ]
            },
            {
                "id": 1,
                "members": ["Davi", "Eva", "Fabio"],
                "shared_categories": [
                    {"category": "Esportes", "people": 3, "percentage": 100.0}
                ]
            }
        ],
        "total_people": 6,
        "total_communities": 2,
        "people_data": {
            "Ana": ["Música", "Cinema"],
            "Bruno": ["Cinema"],
            "Carla": ["Chess", "   ", "Music"],
            "Davi": ["Esportes"],
            "Eva": ["Esportes", "Leitura"],
            "Fabio": ["Esportes"]
        }
    })
}

/// Same shape as [`grouping`] but without `people_data`
pub fn grouping_without_people() -> Value {
    let mut value = grouping();
    value.as_object_mut().unwrap().remove("people_data");
    value
}

/// Regenerated grouping after Ana's interests became Cinema and Teatro
pub fn regrouping() -> Value {
    json!({
        "communities": [
            {
                "id": 0,
                "members": ["Ana", "Carla"],
                "shared_categories": [
                    {"category": "Teatro", "people": 1, "percentage": 50.0}
                ]
            }
        ],
        "total_people": 2,
        "total_communities": 1,
        "people_data": {
            "Ana": ["Cinema", "Teatro"],
            "Carla": ["Chess", "Music"]
        }
    })
}

/// Client holding [`grouping`] as its current result
pub async fn client_with_result(stub: &StubService) -> ReviewClient {
    let client = client_for(stub.base_url());
    stub.queue_analyze(Reply::ok(grouping()));
    client.select_file(csv_file()).await;
    client.analyze().await.unwrap();
    client
}
