mod router_service;

pub use router_service::*;
