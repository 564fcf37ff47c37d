//! The shared API transport every view call goes through.
//!
//! Requests are described by [`OutboundRequest`], run through the
//! interceptor [`Pipeline`](crate::interceptors::Pipeline) and handed to a
//! [`Transport`]. Failure responses come back as [`ApiError`](crate::error::ApiError).

pub mod api_client;
pub mod request;
pub mod response;
pub mod transport;

pub use api_client::ApiClient;
pub use request::{OutboundRequest, RequestBody};
pub use response::{ApiResponse, extract_detail};
pub use transport::{HttpTransport, Transport};
