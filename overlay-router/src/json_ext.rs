use serde::{Deserialize, Serialize};
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;
use std::fmt;

/// A JSON object.
pub type Object = Map<ByteString, Value>;

/// One step of a [`Path`]: either a field name or an array index.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An array index.
    Index(usize),

    /// A field name.
    Key(String),
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::Key(key.to_string())
    }
}

/// The route from the root of a response tree down to one of its nodes.
///
/// A path renders in the dotted form clients use to address response data:
/// keys are joined with `.` and indices attach to the preceding key in
/// bracket notation, so `["a", "b", 2, "c"]` renders as `a.b[2].c`. Keeping
/// indices in brackets means a field that happens to be named `"2"` can never
/// collide with the third element of an array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    /// Returns a new path with `element` appended.
    pub fn join(&self, element: impl Into<PathElement>) -> Self {
        let mut path = self.clone();
        path.0.push(element.into());
        path
    }
}

impl From<Vec<PathElement>> for Path {
    fn from(elements: Vec<PathElement>) -> Self {
        Path(elements)
    }
}

impl<T: Into<PathElement>> FromIterator<T> for Path {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            match element {
                PathElement::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                PathElement::Index(index) => {
                    write!(f, "[{}]", index)?;
                }
            }
        }
        Ok(())
    }
}
