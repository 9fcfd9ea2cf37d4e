//! Accumulates the JSON path breadcrumb reported alongside binder errors.
//! Frames are pushed on the way into a nested bind and popped back out,
//! formatted root-first as `$.foo[2].bar`.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
enum PathItem {
    Field(Box<str>),
    Index(usize),
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Breadcrumb of container frames from the document root down to the
/// value a binder error was raised on. Empty path renders as nothing;
/// a non-empty path renders as `" at $.foo[2].bar"`, ready to be spliced
/// into an error message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonPath(Vec<PathItem>);

impl JsonPath {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push_field(&mut self, name: &str) {
        self.0.push(PathItem::Field(name.into()));
    }

    pub(crate) fn push_index(&mut self, idx: usize) {
        self.0.push(PathItem::Index(idx));
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " at $")?;
        for item in &self.0 {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Runs `f` with `name` pushed onto `path` for the duration of the call,
/// popping it back off afterwards regardless of outcome.
///
/// Public (not `pub(crate)`): `#[derive(Json)]`-generated code in
/// downstream crates calls this directly for each product field.
pub fn with_field<T>(
    path: &mut JsonPath,
    name: &str,
    f: impl FnOnce(&mut JsonPath) -> crate::Result<T>,
) -> crate::Result<T> {
    path.push_field(name);
    let result = f(path);
    path.pop();
    result
}

pub fn with_index<T>(
    path: &mut JsonPath,
    idx: usize,
    f: impl FnOnce(&mut JsonPath) -> crate::Result<T>,
) -> crate::Result<T> {
    path.push_index(idx);
    let result = f(path);
    path.pop();
    result
}

#[cfg(test)]
mod tests {
    use super::JsonPath;

    #[test]
    fn empty_path_renders_nothing() {
        assert_eq!(JsonPath::new().to_string(), "");
    }

    #[test]
    fn nested_path_renders_breadcrumb() {
        let mut path = JsonPath::new();
        path.push_field("users");
        path.push_index(2);
        path.push_field("birthDate");
        assert_eq!(path.to_string(), " at $.users[2].birthDate");
    }
}
