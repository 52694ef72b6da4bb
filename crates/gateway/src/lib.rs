//! API Gateway Library
//!
//! Every remote call of the session client goes through [`ApiGateway`]:
//! - endpoint identifiers are resolved once against the configured base URL
//! - the stored access token is attached as a bearer credential
//! - demo credentials are answered by the simulated transport
//! - a 401 from the server triggers one refresh and one retry

pub mod endpoints;
pub mod gateway;
pub mod http;
pub mod request;
pub mod transport;

pub use endpoints::{Endpoint, EndpointTable, API_PREFIX};
pub use gateway::ApiGateway;
pub use http::{HttpBackend, ReqwestBackend};
pub use request::{ApiResponse, Method, RequestDescriptor, RequestOptions};
pub use transport::{
    RealTransport, ResetHandler, ResetHook, SimulatedTransport, TransportKind, TransportStrategy,
};

#[cfg(any(test, feature = "test-utils"))]
pub use http::MockHttpBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockResetHandler, MockTransportStrategy};
