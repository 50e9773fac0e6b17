//! Client Module
//!
//! Transport seam and its HTTP implementation.

pub mod http;
pub mod transport;

pub use http::HttpClient;
pub use transport::{is_success_status, ByteStream, Transport, TransportResponse};
