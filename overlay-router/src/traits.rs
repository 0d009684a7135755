use crate::error::FetchError;
use crate::request::Request;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use std::fmt::Debug;

/// What came back from the upstream graphql service.
///
/// The body is kept as raw bytes: a non-success response must be handed back
/// to the client exactly as it arrived, so nothing here parses it.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// A fetcher is responsible for delivering a graphql request to the upstream
/// service.
///
/// The goal of this trait is to hide the transport: implementations may go
/// over HTTP, an in-process test double, or anything else that can produce a
/// status and a body. Errors from this trait mean the transport itself
/// failed; an upstream that answered with an error status is a normal
/// [`UpstreamResponse`].
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    async fn fetch(&self, request: Request) -> Result<UpstreamResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::TypeResolver;
    use static_assertions::*;

    assert_obj_safe!(Fetcher);
    assert_obj_safe!(TypeResolver);
}
