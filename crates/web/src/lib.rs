//! Route dispatch, body codecs and local capabilities of local-bridge.
//!
//! A request reaches the [`dispatcher::Dispatcher`] fully received. API paths are resolved in
//! the [`router::RouteTable`], their single argument is decoded from the `args` query key or
//! from the body ([`codec`]), and the handlers of [`api`] call into [`capability::Capabilities`].
//! Everything else is served from [`static_files`].

pub mod api;
pub mod args;
pub mod capability;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod reply;
pub mod router;
pub mod server;
pub mod shutdown;
pub mod static_files;
pub mod tls;

pub use dispatcher::Dispatcher;
pub use error::{ApiError, DispatchError};
pub use reply::Reply;
pub use router::RouteTable;
pub use server::Server;
