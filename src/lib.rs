// src/lib.rs

//! Project Indexer Library
//!
//! Collects public GitHub repositories and gists and HuggingFace models,
//! datasets and spaces into one deduplicated JSON index.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
