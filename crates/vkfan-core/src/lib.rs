pub mod batch;
pub mod credentials;
pub mod error;
pub mod id;
pub mod path;
pub mod query;
pub mod request;
pub mod route;

pub use batch::{batch_ids, IdBatch};
pub use credentials::{Credential, CredentialPool};
pub use error::CoreError;
pub use id::{Ident, RequestId};
pub use path::QueryPath;
pub use query::{singular_param, BaseParams, PageRange, Params, QueryBuilder};
pub use request::{HttpMethod, RequestDescriptor, TransportKind};
pub use route::{EntityRoute, RouteTable, API_URL};
