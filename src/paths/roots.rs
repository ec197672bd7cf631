use super::normalize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// A directory the user granted access to, stored in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuthorizedRoot(PathBuf);

impl AuthorizedRoot {
    /// `None` when `raw` is not an absolute path.
    pub fn new(raw: &str) -> Option<Self> {
        normalize(raw).map(Self)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AuthorizedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Set of authorized roots, unique by normalized path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizedRoots(BTreeSet<AuthorizedRoot>);

impl AuthorizedRoots {
    /// Builds the set from raw strings, skipping entries that are not
    /// absolute paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roots = BTreeSet::new();
        for raw in paths {
            let raw = raw.as_ref();
            match AuthorizedRoot::new(raw) {
                Some(root) => {
                    roots.insert(root);
                }
                None => tracing::warn!(root = raw, "ignoring authorized root that is not absolute"),
            }
        }
        Self(roots)
    }

    pub fn insert(&mut self, root: AuthorizedRoot) -> bool {
        self.0.insert(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthorizedRoot> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AuthorizedRoot> for AuthorizedRoots {
    fn from_iter<T: IntoIterator<Item = AuthorizedRoot>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
