use std::cmp::Ordering;
use std::fmt;

/// Server-side unit of versioning: a root path plus override selectors.
///
/// Overrides are significant in order; `["base", "prod"]` and `["prod", "base"]`
/// are different namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceKey {
    pub root_path: String,
    pub overrides: Vec<String>,
}

/// One document within a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub document: String,
    pub flavors: Vec<String>,
}

/// Server-assigned version of a namespace.
///
/// Versions only compare within the same `namespace_id`; `partial_cmp` returns
/// `None` across namespace ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionKey {
    pub namespace_id: u64,
    pub version: u32,
}

impl NamespaceKey {
    pub fn new<P, I, S>(
        root_path: P,
        overrides: I,
    ) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_path: root_path.into(),
            overrides: overrides.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigKey {
    pub fn new<D, I, S>(
        document: D,
        flavors: I,
    ) -> Self
    where
        D: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            document: document.into(),
            flavors: flavors.into_iter().map(Into::into).collect(),
        }
    }

    /// Document without flavors
    pub fn document(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            flavors: Vec::new(),
        }
    }
}

impl VersionKey {
    pub fn new(
        namespace_id: u64,
        version: u32,
    ) -> Self {
        Self { namespace_id, version }
    }

    /// Whether `self` should replace `current`.
    ///
    /// A different namespace id means the server recreated the namespace, so
    /// the incoming version supersedes whatever was held.
    pub fn supersedes(
        &self,
        current: &VersionKey,
    ) -> bool {
        match self.partial_cmp(current) {
            Some(ordering) => ordering == Ordering::Greater,
            None => true,
        }
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        if self.namespace_id != other.namespace_id {
            return None;
        }
        Some(self.version.cmp(&other.version))
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.root_path)?;
        if !self.overrides.is_empty() {
            write!(f, "[{}]", self.overrides.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.document)?;
        if !self.flavors.is_empty() {
            write!(f, "[{}]", self.flavors.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}@{}", self.namespace_id, self.version)
    }
}
