use super::SolutionTree;
use sha2::{Digest, Sha256};
use std::fmt;

/// Structural fingerprint of a solution tree.
///
/// Two trees have equal keys exactly when they are structurally equal. Names are
/// length-prefixed (`4:Life(3:Mud(...),...)`) so that names containing the separator
/// characters cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn of(tree: &SolutionTree) -> Self {
        let mut key = String::with_capacity(tree.node_count() * 12);
        write_key(tree, &mut key);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 of the key, for compact storage or transport.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

fn write_key(tree: &SolutionTree, out: &mut String) {
    let name = tree.name();
    out.push_str(&name.len().to_string());
    out.push(':');
    out.push_str(name);
    if let Some((first, second)) = tree.children() {
        out.push('(');
        write_key(first, out);
        out.push(',');
        write_key(second, out);
        out.push(')');
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
