pub mod base;
pub mod bearer;
pub mod unauthorized;
pub mod versioning;

// Re-export from base.rs so we can do "use crate::interceptors::*;"
pub use base::{InboundInterceptor, OutboundInterceptor, Pipeline};
pub use bearer::BearerAuth;
pub use unauthorized::UnauthorizedHandler;
pub use versioning::{ApiPrefixes, ApiVersioning};
