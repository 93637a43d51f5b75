//! TAAG Offline Cache Manager
//!
//! This crate provides the offline caching layer for the Text-to-ASCII-Art
//! generator. A lifecycle-driven worker sits between the page and the
//! network, pre-warming an application-shell cache and a figlet font cache
//! at install time and answering fetches with per-resource strategies:
//! cache-first for the immutable font files, network-first with a cached
//! fallback chain for everything else.
//!
//! # Architecture
//!
//! - `config`: Cache partition names, asset manifest, curated font list
//! - `fetch`: Request/response types with single-use bodies and checked cloning
//! - `cache`: Named cache partitions keyed by URL, plus the partition registry
//! - `net`: The network boundary trait and its HTTP implementation
//! - `tasks`: Fail-fast and best-effort concurrent task joins
//! - `worker`: The lifecycle state machine and fetch strategies
//! - `error`: Worker-level error taxonomy

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod net;
pub mod tasks;
pub mod worker;

pub use cache::{Cache, CacheStorage};
pub use config::WorkerConfig;
pub use error::WorkerError;
pub use fetch::{Method, Request, Response};
pub use net::{HttpFetcher, NetworkFetcher};
pub use worker::{FetchOutcome, OfflineWorker, WorkerState};
