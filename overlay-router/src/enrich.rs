use crate::error::{BoxError, FetchError};
use crate::json_ext::{Object, Path};
use crate::spec::TYPENAME;
use crate::visitor::{self, ResponseVisitor};
use async_trait::async_trait;
use serde_json_bytes::Value;

/// The capability that produces supplementary data for a response node.
///
/// Invoked once per object node whose runtime type could be resolved; the
/// implementation decides whether the type is relevant and returns data or
/// nothing. It may perform its own external calls and may fail; a failure
/// aborts the whole enrichment pass.
#[async_trait]
pub trait TypeResolver: Send + Sync {
    async fn resolve(
        &self,
        type_name: &str,
        path: &Path,
        object: &Object,
    ) -> Result<Option<Value>, BoxError>;
}

struct Enricher<'a, R> {
    resolver: &'a R,
    alias: &'a str,
    extensions: Object,
}

#[async_trait]
impl<'a, R> ResponseVisitor for Enricher<'a, R>
where
    R: TypeResolver,
{
    type Error = FetchError;

    async fn visit_object(&mut self, path: &Path, object: &mut Object) -> Result<(), FetchError> {
        // the client's own discriminator wins over the injected one
        let type_name = object
            .get(TYPENAME)
            .or_else(|| object.get(self.alias))
            .and_then(|value| value.as_str())
            .map(|type_name| type_name.to_string());

        if let Some(type_name) = type_name {
            match self.resolver.resolve(&type_name, path, object).await {
                Ok(Some(value)) if !value.is_null() => {
                    tracing::trace!(%path, type_name = type_name.as_str(), "node enriched");
                    self.extensions.insert(path.to_string(), value);
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::error!(%path, %error, "resolver failed, aborting enrichment");
                    return Err(FetchError::ResolverFailed {
                        path: path.to_string(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        // strip the injected artifact whether or not it was used
        object.remove(self.alias);

        Ok(())
    }
}

/// Run one enrichment pass over `data` and return the completed extension
/// map, keyed by rendered path.
///
/// The tree is visited depth first; each node's runtime type is read from its
/// own `__typename` or, failing that, from the injected `alias` entry, and
/// the resolver is invoked for every node with a resolvable type. The alias
/// entry is deleted from every node on the way through, so the tree that
/// reaches the client carries no injected artifacts and a repeated pass falls
/// back to natural discriminators only.
#[tracing::instrument(skip_all, level = "trace")]
pub async fn collect_extensions<R>(
    data: &mut Value,
    alias: &str,
    resolver: &R,
) -> Result<Object, FetchError>
where
    R: TypeResolver,
{
    let mut enricher = Enricher {
        resolver,
        alias,
        extensions: Object::new(),
    };
    visitor::visit(data, &mut enricher).await?;
    Ok(enricher.extensions)
}
