use crate::enrich::{collect_extensions, TypeResolver};
use crate::error::FetchError;
use crate::request::Request;
use crate::response::Response;
use crate::spec::Query;
use crate::traits::Fetcher;
use bytes::Bytes;
use http::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// What the service hands back to the transport layer.
#[derive(Clone, Debug)]
pub struct RouterResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// The request pipeline: rewrite, fetch, enrich, merge.
///
/// One instance serves any number of concurrent requests; the only shared
/// state is the sequence seeding each request's discriminator alias.
#[derive(Debug)]
pub struct RouterService<F, R> {
    fetcher: F,
    resolver: R,
    alias_seq: AtomicU64,
}

impl<F, R> RouterService<F, R>
where
    F: Fetcher,
    R: TypeResolver,
{
    pub fn new(fetcher: F, resolver: R) -> Self {
        Self {
            fetcher,
            resolver,
            alias_seq: AtomicU64::new(0),
        }
    }

    /// Handle one graphql request.
    ///
    /// A query that does not parse never reaches the upstream: it is answered
    /// directly with a graphql error body. An upstream non-success status is
    /// handed back byte for byte, untouched. Otherwise the response data is
    /// enriched and the computed extension map is shallow merged into the
    /// response's `extensions`, colliding keys overwritten.
    ///
    /// `Err` here means the request failed as a whole: the transport broke,
    /// the upstream body was not a graphql response, or the resolver failed
    /// for some node.
    #[tracing::instrument(skip_all)]
    pub async fn call(&self, request: Request) -> Result<RouterResponse, FetchError> {
        let query = match Query::parse(request.query.as_str()) {
            Ok(query) => query,
            Err(error) => {
                tracing::debug!(%error, "query rejected");
                return Ok(RouterResponse {
                    status: StatusCode::BAD_REQUEST,
                    body: error.to_response().to_bytes(),
                });
            }
        };

        let alias = query.typename_alias(self.alias_seq.fetch_add(1, Ordering::Relaxed));
        let upstream_request = Request {
            query: query.with_typename(&alias),
            ..request
        };

        let upstream = self.fetcher.fetch(upstream_request).await?;
        if !upstream.status.is_success() {
            tracing::debug!(status = %upstream.status, "upstream failed, passing its response through");
            return Ok(RouterResponse {
                status: upstream.status,
                body: upstream.body,
            });
        }

        let mut response = Response::from_bytes(upstream.body)?;
        let enriched =
            collect_extensions(&mut response.data, alias.as_str(), &self.resolver).await?;
        for (path, value) in enriched {
            response.extensions.insert(path, value);
        }

        Ok(RouterResponse {
            status: upstream.status,
            body: response.to_bytes(),
        })
    }
}
