pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod options;
pub mod requests;
pub mod subquery;
pub mod tree;

pub use dispatcher::Dispatcher;
pub use error::QueryError;
pub use handler::{HandlerContext, HandlerFn, HandlerOutput, HandlerRegistry};
pub use options::{CallOptions, Limit, PageSpec};
pub use subquery::{GroupSpec, SubQuery, SubQueryBuilder};
pub use tree::ResultTree;
