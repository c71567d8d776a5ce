//! msdetect - Microservice architecture detector library
//!
//! This library classifies the deployment architecture of source
//! repositories from their container artifacts:
//! - Multi-container descriptors (docker-compose.yml) become service dependency graphs
//! - Services, container files and manifests are tagged against role taxonomies
//! - Evidence is merged into one record per repository
//! - Large repository lists are processed concurrently and resumably

pub mod aggregate;
pub mod analyzer;
pub mod artifact;
pub mod cli;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod input;
pub mod lock;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod progress;
pub mod run_log;
pub mod store;
pub mod taxonomy;
