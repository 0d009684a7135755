use crate::json_ext::{Object, Path, PathElement};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json_bytes::Value;

/// A visitor over the object nodes of a JSON-like response tree.
///
/// The walk is depth first and pre order: a node's visit completes, including
/// any asynchronous work, before its children are inspected, so a visitor may
/// mutate the node and the traversal will see the mutated children. Siblings
/// are visited in key insertion order, array elements in index order, one
/// visit in flight at a time.
#[async_trait]
pub trait ResponseVisitor: Send {
    type Error: Send;

    async fn visit_object(&mut self, path: &Path, object: &mut Object)
        -> Result<(), Self::Error>;
}

/// Walks `root`, invoking `visitor` on every object node with its [`Path`].
///
/// The root itself is visited with the empty path if it is an object. Scalars
/// and nulls are not recursed into and receive no visit. A visitor error
/// aborts the walk immediately; mutations already applied are kept.
pub async fn visit<V>(root: &mut Value, visitor: &mut V) -> Result<(), V::Error>
where
    V: ResponseVisitor,
{
    visit_value(Path::default(), root, visitor).await
}

fn visit_value<'a, V>(
    path: Path,
    value: &'a mut Value,
    visitor: &'a mut V,
) -> BoxFuture<'a, Result<(), V::Error>>
where
    V: ResponseVisitor,
{
    Box::pin(async move {
        match value {
            Value::Object(object) => {
                visitor.visit_object(&path, object).await?;

                for (key, child) in object.iter_mut() {
                    if child.is_object() || child.is_array() {
                        let path = path.join(PathElement::Key(key.as_str().to_string()));
                        visit_value(path, child, visitor).await?;
                    }
                }
            }
            Value::Array(array) => {
                for (index, element) in array.iter_mut().enumerate() {
                    if element.is_object() || element.is_array() {
                        visit_value(path.join(index), element, visitor).await?;
                    }
                }
            }
            _ => {}
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;
    use std::convert::Infallible;

    #[derive(Default)]
    struct PathRecorder {
        visited: Vec<String>,
    }

    #[async_trait]
    impl ResponseVisitor for PathRecorder {
        type Error = Infallible;

        async fn visit_object(
            &mut self,
            path: &Path,
            _object: &mut Object,
        ) -> Result<(), Infallible> {
            self.visited.push(path.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn parents_are_visited_before_descendants_and_arrays_in_order() {
        let mut tree = json!({
            "country": {
                "cities": {
                    "edges": [
                        { "node": { "name": "Lyon" } },
                        42,
                        { "node": { "name": "Brest" } },
                    ],
                },
            },
            "scalar": "untouched",
        });

        let mut recorder = PathRecorder::default();
        visit(&mut tree, &mut recorder).await.unwrap();

        assert_eq!(
            recorder.visited,
            vec![
                "",
                "country",
                "country.cities",
                "country.cities.edges[0]",
                "country.cities.edges[0].node",
                "country.cities.edges[2]",
                "country.cities.edges[2].node",
            ]
        );
    }

    #[tokio::test]
    async fn scalars_and_nulls_are_not_visited() {
        let mut tree = json!({
            "a": null,
            "b": [1, "two", null],
            "c": { "d": null },
        });

        let mut recorder = PathRecorder::default();
        visit(&mut tree, &mut recorder).await.unwrap();

        assert_eq!(recorder.visited, vec!["", "c"]);
    }

    #[tokio::test]
    async fn nested_arrays_extend_the_path_with_further_indices() {
        let mut tree = json!({ "rows": [[{ "cell": 1 }], [null, { "cell": 2 }]] });

        let mut recorder = PathRecorder::default();
        visit(&mut tree, &mut recorder).await.unwrap();

        assert_eq!(recorder.visited, vec!["", "rows[0][0]", "rows[1][1]"]);
    }

    struct SubtreeDropper;

    #[async_trait]
    impl ResponseVisitor for SubtreeDropper {
        type Error = Infallible;

        async fn visit_object(
            &mut self,
            _path: &Path,
            object: &mut Object,
        ) -> Result<(), Infallible> {
            object.remove("drop");
            Ok(())
        }
    }

    #[tokio::test]
    async fn mutations_are_applied_before_children_are_inspected() {
        let mut tree = json!({
            "drop": { "never": { "visited": true } },
            "keep": { "drop": { "also": "gone" } },
        });

        let mut dropper = SubtreeDropper;
        visit(&mut tree, &mut dropper).await.unwrap();

        assert_eq!(tree, json!({ "keep": {} }));
    }

    struct FailsAt {
        target: String,
        visited: Vec<String>,
    }

    #[async_trait]
    impl ResponseVisitor for FailsAt {
        type Error = String;

        async fn visit_object(&mut self, path: &Path, _object: &mut Object) -> Result<(), String> {
            let rendered = path.to_string();
            if rendered == self.target {
                return Err(format!("boom at {rendered}"));
            }
            self.visited.push(rendered);
            Ok(())
        }
    }

    #[tokio::test]
    async fn a_visitor_error_aborts_the_walk() {
        let mut tree = json!({
            "first": {},
            "second": { "child": {} },
            "third": {},
        });

        let mut visitor = FailsAt {
            target: "second".to_string(),
            visited: Vec::new(),
        };
        let error = visit(&mut tree, &mut visitor).await.unwrap_err();

        assert_eq!(error, "boom at second");
        // nothing after the failing node was visited
        assert_eq!(visitor.visited, vec!["", "first"]);
    }
}
