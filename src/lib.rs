// src/lib.rs

//! Marketplace Listing Scraper Library

pub mod browser;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
