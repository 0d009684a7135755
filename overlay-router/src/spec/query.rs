use crate::error::FetchError;
use apollo_compiler::ast;
use apollo_compiler::name;
use apollo_compiler::Name;
use apollo_compiler::Node;
use std::collections::HashSet;

pub(crate) const TYPENAME: &str = "__typename";

/// A parsed graphql query.
///
/// Holds the source string alongside its document so the query can be
/// rewritten any number of times without re-parsing; rewrites work on a clone
/// of the document and never mutate the parsed state.
#[derive(Debug, Clone)]
pub struct Query {
    string: String,
    document: ast::Document,
}

impl Query {
    /// Returns a reference to the underlying query string.
    pub fn as_str(&self) -> &str {
        self.string.as_str()
    }

    #[tracing::instrument(skip_all, level = "trace")]
    pub fn parse(query: impl Into<String>) -> Result<Self, FetchError> {
        let string = query.into();

        let document = ast::Document::parse(string.clone(), "query.graphql").map_err(
            |invalid| FetchError::MalformedQuery {
                reason: invalid.errors.to_string(),
            },
        )?;

        Ok(Query { string, document })
    }

    /// Derive the discriminator alias for one request.
    ///
    /// The alias is seeded by a request-scoped sequence number and bumped
    /// until it differs from every response key the client uses anywhere in
    /// the document, so an injected field can never shadow client data.
    pub fn typename_alias(&self, seed: u64) -> Name {
        let used = self.response_keys();
        let mut seed = seed;
        loop {
            let candidate = format!("__typename_{seed:x}");
            if !used.contains(candidate.as_str()) {
                return Name::new(candidate.as_str())
                    .expect("a generated alias is a valid graphql name; qed");
            }
            seed = seed.wrapping_add(1);
        }
    }

    /// Rewrite the query so every selection set requests the type
    /// discriminator under `alias`.
    ///
    /// A selection set that already requests `__typename` without an alias is
    /// left untouched: the client's own value is authoritative and will be
    /// read back directly. Everywhere else the aliased field is prepended, so
    /// its position does not depend on the other selections in the set.
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn with_typename(&self, alias: &Name) -> String {
        let mut document = self.document.clone();

        for definition in document.definitions.iter_mut() {
            match definition {
                ast::Definition::OperationDefinition(operation) => {
                    add_typename(&mut operation.make_mut().selection_set, alias);
                }
                ast::Definition::FragmentDefinition(fragment) => {
                    add_typename(&mut fragment.make_mut().selection_set, alias);
                }
                _ => {}
            }
        }

        document.to_string()
    }

    /// Every response key (field name or alias) the document uses.
    fn response_keys(&self) -> HashSet<&str> {
        let mut keys = HashSet::new();
        for definition in &self.document.definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => {
                    collect_response_keys(&operation.selection_set, &mut keys);
                }
                ast::Definition::FragmentDefinition(fragment) => {
                    collect_response_keys(&fragment.selection_set, &mut keys);
                }
                _ => {}
            }
        }
        keys
    }
}

fn collect_response_keys<'a>(selections: &'a [ast::Selection], keys: &mut HashSet<&'a str>) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => {
                keys.insert(field.name.as_str());
                if let Some(alias) = &field.alias {
                    keys.insert(alias.as_str());
                }
                collect_response_keys(&field.selection_set, keys);
            }
            ast::Selection::InlineFragment(inline_fragment) => {
                collect_response_keys(&inline_fragment.selection_set, keys);
            }
            ast::Selection::FragmentSpread(_) => {}
        }
    }
}

fn add_typename(selections: &mut Vec<ast::Selection>, alias: &Name) {
    for selection in selections.iter_mut() {
        match selection {
            ast::Selection::Field(field) => {
                add_typename(&mut field.make_mut().selection_set, alias);
            }
            ast::Selection::InlineFragment(inline_fragment) => {
                add_typename(&mut inline_fragment.make_mut().selection_set, alias);
            }
            ast::Selection::FragmentSpread(_) => {}
        }
    }

    // an empty selection list is a scalar leaf, not a selection set
    if selections.is_empty() {
        return;
    }

    let has_bare_typename = selections.iter().any(|selection| {
        matches!(
            selection,
            ast::Selection::Field(field)
                if field.name.as_str() == TYPENAME && field.alias.is_none()
        )
    });
    if has_bare_typename {
        return;
    }

    selections.insert(
        0,
        ast::Selection::Field(Node::new(ast::Field {
            alias: Some(alias.clone()),
            name: name!("__typename"),
            arguments: Vec::new(),
            directives: Default::default(),
            selection_set: Vec::new(),
        })),
    );
}
