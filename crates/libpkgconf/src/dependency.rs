//! Dependency specification parsing and representation.
//!
//! A dependency is a constraint of the form `name [op version]`, as found in
//! the `Requires`, `Requires.private`, `Conflicts`, and `Provides` fields of
//! a `.pc` file. This module parses those constraint lists and provides the
//! [`Dependency`] and [`DependencyList`] types used throughout the crate to
//! represent them.

use std::fmt;

use crate::error::{Error, Result};
use crate::version::Comparator;

/// A single dependency constraint: a package name with an optional version
/// comparator and target version.
///
/// # Example
///
/// ```rust
/// use libpkgconf::dependency::Dependency;
/// use libpkgconf::version::Comparator;
///
/// let dep = Dependency::with_version("zlib", Comparator::GreaterThanEqual, "1.2.0");
/// assert!(dep.version_satisfied_by("1.2.11"));
/// assert!(!dep.version_satisfied_by("1.1.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The package name being depended upon.
    pub package: String,

    /// The version comparator. `Comparator::Any` when no constraint was given.
    pub compare: Comparator,

    /// The target version string, if a comparator was specified.
    pub version: Option<String>,
}

impl Dependency {
    /// Create an unconstrained dependency on `name` (matches any version).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            package: name.into(),
            compare: Comparator::Any,
            version: None,
        }
    }

    /// Create a version-constrained dependency.
    pub fn with_version(
        name: impl Into<String>,
        compare: Comparator,
        version: impl Into<String>,
    ) -> Self {
        Self {
            package: name.into(),
            compare,
            version: Some(version.into()),
        }
    }

    /// Check whether `actual_version` satisfies this dependency's constraint.
    ///
    /// A dependency with no version constraint (`Comparator::Any`) is
    /// satisfied by any version, including an empty one.
    pub fn version_satisfied_by(&self, actual_version: &str) -> bool {
        match &self.version {
            Some(required) => self.compare.eval(actual_version, required),
            None => true,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {} {}", self.package, self.compare.as_str(), version),
            None => write!(f, "{}", self.package),
        }
    }
}

/// An ordered list of [`Dependency`] constraints, as found in a single
/// `Requires`-style field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    entries: Vec<Dependency>,
}

impl DependencyList {
    /// Create an empty dependency list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a `Requires`-style field value into a list of dependencies.
    ///
    /// Entries are separated by commas and/or whitespace. A name may be
    /// followed by a comparator (`=`, `!=`, `<`, `<=`, `>`, `>=`) and a
    /// version token. A comparator with no following version token is a
    /// syntax error (`Error::DependencySyntax`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use libpkgconf::dependency::DependencyList;
    ///
    /// let deps = DependencyList::parse("zlib >= 1.2, libfoo = 2.0 libbar").unwrap();
    /// assert_eq!(deps.len(), 3);
    /// assert_eq!(deps.iter().next().unwrap().package, "zlib");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input);
        let mut entries = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let name = tokens[i].clone();
            i += 1;

            if i < tokens.len() && is_comparator_token(&tokens[i]) {
                let compare = Comparator::from_str(&tokens[i]).unwrap_or(Comparator::Any);
                i += 1;

                if i < tokens.len() && !is_comparator_token(&tokens[i]) {
                    let version = tokens[i].clone();
                    i += 1;
                    entries.push(Dependency::with_version(name, compare, version));
                } else {
                    return Err(Error::DependencySyntax {
                        text: input.to_string(),
                        message: format!("comparator for '{name}' has no following version"),
                    });
                }
            } else {
                entries.push(Dependency::new(name));
            }
        }

        Ok(Self { entries })
    }

    /// Push a dependency onto the end of the list.
    pub fn push(&mut self, dep: Dependency) {
        self.entries.push(dep);
    }

    /// Append another list's entries onto this one, preserving order.
    pub fn append(&mut self, other: &DependencyList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.entries.iter()
    }

    /// Iterate mutably over the entries, e.g. to apply a CLI-supplied
    /// version override to otherwise-unconstrained dependencies.
    pub fn entries_mut(&mut self) -> std::slice::IterMut<'_, Dependency> {
        self.entries.iter_mut()
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Dependency> for DependencyList {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DependencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.entries.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Split a `Requires`-style field into name/comparator/version tokens.
///
/// Commas are treated as whitespace. Comparator characters (`=`, `!`, `<`,
/// `>`) glue to any immediately adjacent comparator characters so that
/// `>=` and `!=` form a single token even when written without surrounding
/// spaces (e.g. `zlib>=1.2`).
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_operator = false;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    };

    for c in input.chars() {
        if c == ',' || c.is_whitespace() {
            flush(&mut current, &mut tokens);
            current_is_operator = false;
            continue;
        }

        let is_operator_char = crate::version::is_operator_char(c);

        if current.is_empty() {
            current.push(c);
            current_is_operator = is_operator_char;
        } else if is_operator_char == current_is_operator {
            current.push(c);
        } else {
            flush(&mut current, &mut tokens);
            current.push(c);
            current_is_operator = is_operator_char;
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

/// Whether a token is entirely made of version-operator characters.
fn is_comparator_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(crate::version::is_operator_char)
}
