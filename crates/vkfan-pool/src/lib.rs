pub mod error;
pub mod http;
pub mod pool;
pub mod testing;
pub mod transport;

pub use error::{PoolError, TransportError};
pub use http::{HttpTransport, HttpTransportBuilder};
pub use pool::{CompletionHandler, PoolState, TaskPool, Wave};
pub use transport::{Completed, RawResponse, Transport};
