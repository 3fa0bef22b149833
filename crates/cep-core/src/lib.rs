//! # cep-core
//!
//! Core library for cepd, a cached lookup service for Brazilian postal codes
//! (CEPs) backed by the ViaCEP directory API.
//!
//! - **[`types`]**: the canonical 8-digit [`types::Cep`] code and the
//!   normalized [`types::AddressRecord`] it resolves to.
//!
//! - **[`cache`]**: the [`cache::CacheStore`] trait with in-memory and
//!   file-backed implementations. Entries expire by TTL only.
//!
//! - **[`upstream`]**: a bounded-timeout HTTP client for the ViaCEP API.
//!
//! - **[`lookup`]**: the cache-aside pipeline tying the above together, and
//!   the typed failure taxonomy callers map to HTTP status codes.
//!
//! - **[`config`]**: layered application configuration.
//!
//! ## Request flow
//!
//! ```text
//! raw input
//!     │
//!     ▼
//! ┌───────────┐
//! │ Normalize │ ── reject ──► InvalidInput
//! └─────┬─────┘
//!       ▼
//! ┌────────────┐
//! │ Cache read │ ── hit ──► AddressRecord (service = "cache")
//! └─────┬──────┘
//!       │ miss
//!       ▼
//! ┌──────────────┐
//! │ ViaCEP GET   │ ── transport failure ──► UpstreamUnavailable
//! └─────┬────────┘
//!       ▼
//! ┌──────────────┐
//! │ Validate/map │ ── 408 / 5xx / erro / bad body ──► typed failure
//! └─────┬────────┘
//!       ▼
//! ┌──────────────┐
//! │ Cache write  │  (best effort, never fails the lookup)
//! └─────┬────────┘
//!       ▼
//! AddressRecord (service = "viacep")
//! ```

pub mod cache;
pub mod config;
pub mod lookup;
pub mod types;
pub mod upstream;
