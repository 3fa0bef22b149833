//! Upstream HTTP client for the ViaCEP directory API.

mod client;

pub use client::{RawResponse, TransportError, ViaCepClient};
