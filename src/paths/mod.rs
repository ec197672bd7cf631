//! Path containment against the user's authorized roots.
//!
//! Everything here is lexical: no filesystem access, no symlink resolution.
//! The requester uses it to decide menu eligibility before any request exists.

mod roots;

pub use roots::{AuthorizedRoot, AuthorizedRoots};

use std::path::{Component, Path, PathBuf};

/// Normalize an absolute path: collapse repeated separators, drop `.`
/// segments, resolve `..` lexically (never above `/`) and strip trailing
/// separators.
///
/// Returns `None` for empty, relative or NUL-containing input.
pub fn normalize(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() || raw.contains('\0') {
        return None;
    }
    let path = Path::new(raw);
    if !path.is_absolute() {
        return None;
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, so `/..` stays `/`.
                normalized.pop();
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    Some(normalized)
}

/// Whether `candidate` equals or lies under one of `roots`.
///
/// Matching is per path segment, so `/a/Documents2` is not under
/// `/a/Documents`. Total: malformed input is simply never contained.
pub fn is_contained(candidate: &str, roots: &AuthorizedRoots) -> bool {
    if roots.is_empty() {
        return false;
    }
    let Some(candidate) = normalize(candidate) else {
        return false;
    };
    roots.iter().any(|root| candidate.starts_with(root.as_path()))
}
