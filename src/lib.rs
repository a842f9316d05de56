pub mod asset_cache;
pub mod config;
pub mod export;
pub mod extract;
pub mod fetcher;
pub mod http_client;
pub mod match_api;
pub mod match_model;
pub mod paginator;
pub mod pipeline;
