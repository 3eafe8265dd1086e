//! jsonrpc-dispatch: transport-agnostic JSON-RPC 2.0 dispatcher.
//!
//! Build a [`HandlerRegistry`], freeze it into a [`Dispatcher`], and feed it
//! requests that passed [`envelope::parse_request`]. Every request yields
//! exactly one [`JsonRpcResponse`].

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod registry;
pub mod schema;
pub mod types;

pub use dispatcher::{Dispatched, Dispatcher, Outcome};
pub use envelope::{parse_request, parse_request_slice, parse_request_str, EnvelopeError};
pub use error::{error_codes, DispatchError, DispatchResult};
pub use handler::{handler_fn, FnHandler, MethodHandler};
pub use registry::{HandlerRegistry, Registration};
pub use schema::{Issue, IssueCode, ParamsSchema, ValidationError, Validator};
pub use types::*;
