// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in
//! `application::port` that this crate can provide itself. The stream
//! client, media element and fullscreen host belong to the host
//! environment and have no adapter here.
//!
//! # Available Adapters
//!
//! - [`http`]: Timemark persistence over a JSON REST API (implements [`TimemarkBackend`])
//!
//! [`TimemarkBackend`]: crate::application::port::TimemarkBackend

pub mod http;

pub use http::HttpTimemarkBackend;
