//! Additive enrichment for graphql responses.
//!
//! The service rewrites an incoming query so every selection set carries an
//! aliased `__typename`, forwards it to the upstream graphql service, then
//! walks the response data and lets a pluggable [`TypeResolver`] attach
//! supplementary data per node. Whatever the resolver produces is merged into
//! the response's `extensions` under dotted path keys, so the shape the
//! client asked for is never altered.

mod enrich;
mod error;
mod json_ext;
mod request;
mod response;
mod services;
mod spec;
mod traits;
mod visitor;

pub use enrich::*;
pub use error::*;
pub use json_ext::*;
pub use request::*;
pub use response::*;
pub use services::*;
pub use spec::*;
pub use traits::*;
pub use visitor::*;
