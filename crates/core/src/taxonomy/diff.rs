//! JSON Patch (RFC 6902) diff between two taxonomy snapshots.
//!
//! Paths are JSON Pointers of the form `/<facet>/<key>`. Keys are escaped as
//! reference tokens, so the location `/data` is addressed as
//! `/locationCounts/~1data`.

use serde::{Deserialize, Serialize};

use super::types::{Facet, TaxonomyError, TaxonomySnapshot};

/// A single patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: u64 },
    Replace { path: String, value: u64 },
    Remove { path: String },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path } => path,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Remove { .. } => "remove",
        }
    }
}

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn pointer(facet: Facet, key: &str) -> String {
    format!("/{}/{}", facet.as_str(), escape_token(key))
}

fn parse_pointer(path: &str) -> Result<(Facet, String), TaxonomyError> {
    let invalid = || TaxonomyError::InvalidPatchPath(path.to_string());

    let (facet_name, token) = path
        .strip_prefix('/')
        .and_then(|rest| rest.split_once('/'))
        .ok_or_else(invalid)?;

    // Nested pointers never address a bucket.
    if token.contains('/') {
        return Err(invalid());
    }

    let facet = Facet::from_name(facet_name).ok_or_else(invalid)?;
    Ok((facet, unescape_token(token)))
}

/// Compute the operations that transform `previous` into `current`.
///
/// Output is facet-major in [`Facet::ALL`] order. Within a facet, removals and
/// replacements follow the key order of `previous`, then additions follow the
/// key order of `current`.
pub fn compare(previous: &TaxonomySnapshot, current: &TaxonomySnapshot) -> Vec<PatchOperation> {
    let mut ops = Vec::new();

    for facet in Facet::ALL {
        let before = previous.facet(facet);
        let after = current.facet(facet);

        for (key, old) in before {
            match after.get(key) {
                None => ops.push(PatchOperation::Remove {
                    path: pointer(facet, key),
                }),
                Some(new) if new != old => ops.push(PatchOperation::Replace {
                    path: pointer(facet, key),
                    value: *new,
                }),
                Some(_) => {}
            }
        }

        for (key, new) in after {
            if !before.contains_key(key) {
                ops.push(PatchOperation::Add {
                    path: pointer(facet, key),
                    value: *new,
                });
            }
        }
    }

    ops
}

/// Replay `ops` onto `snapshot` in order.
///
/// Stops at the first invalid operation; operations before it stay applied.
pub fn apply(snapshot: &mut TaxonomySnapshot, ops: &[PatchOperation]) -> Result<(), TaxonomyError> {
    for op in ops {
        let (facet, key) = parse_pointer(op.path())?;
        let bucket = snapshot.facet_mut(facet);

        match op {
            PatchOperation::Add { value, .. } => {
                bucket.insert(key, *value);
            }
            PatchOperation::Replace { path, value } => match bucket.get_mut(&key) {
                Some(existing) => *existing = *value,
                None => return Err(TaxonomyError::MissingPatchTarget(path.clone())),
            },
            PatchOperation::Remove { path } => {
                if bucket.shift_remove(&key).is_none() {
                    return Err(TaxonomyError::MissingPatchTarget(path.clone()));
                }
            }
        }
    }

    Ok(())
}
