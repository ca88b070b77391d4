//! Static file server
//!
//! Serves a directory tree over HTTP/1.1 with byte ranges, conditional
//! caching, gzip/deflate compression and optional directory listings.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
