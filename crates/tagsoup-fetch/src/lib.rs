//! HTTP collaborators for the tagsoup engine.
//!
//! - [`HttpFetcher`]: the [`Fetch`](tagsoup_markup::Fetch) used by video
//!   adapters whose identifiers hide behind a page lookup
//! - [`FormulaClient`]: a [`FormulaService`](tagsoup_markup::FormulaService)
//!   that pre-renders formulas on a remote service
//!
//! Both are blocking and built on `ureq`. Failures surface to the engine as
//! [`ServiceError`](tagsoup_markup::error::ServiceError), which keeps the
//! affected markup as plain text.

mod error;
mod formula;
mod http;

pub use error::FetchError;
pub use formula::FormulaClient;
pub use http::{DEFAULT_TIMEOUT, HttpFetcher, create_agent};
