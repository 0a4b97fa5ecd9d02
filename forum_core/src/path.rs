//! Materialized reply paths.
//!
//! A post's path is the chain of post ids from its thread root down to the
//! post itself. Comparing two paths element by element gives depth-first
//! pre-order: an ancestor is a strict prefix of every descendant and so sorts
//! before it, and siblings sort by id, which is creation order.
//!
//! The store keeps a path as one text column made of fixed-width hex
//! segments. Every segment has the same width, so plain string comparison of
//! two keys agrees with [`Ord`] on [`PostPath`]. That keeps `ORDER BY path`
//! and `path > ?` meaningful on engines without array types.

use sea_orm::{
    sea_query::{ArrayType, Nullable, ValueType, ValueTypeErr},
    ColumnType, DbErr, QueryResult, TryGetError, TryGetable, Value,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ids::PostId;

/// Hex digits per path segment. Ids are positive `i64`, so 16 digits hold any of them.
const SEGMENT_WIDTH: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathKeyError {
    #[error("path key length {0} is not a multiple of {SEGMENT_WIDTH}")]
    Length(usize),
    #[error("path key segment {0:?} is not a positive hex id")]
    Segment(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostPath(Vec<PostId>);

impl PostPath {
    /// Path for a freshly allocated post: `[id]` for a root post, otherwise
    /// the parent's path extended by `id`.
    ///
    /// The caller has already checked that the parent belongs to the same
    /// thread as the new post.
    pub fn assign(id: PostId, parent: Option<&PostPath>) -> Self {
        let mut segments = match parent {
            Some(parent) => {
                let mut segments = Vec::with_capacity(parent.0.len() + 1);
                segments.extend_from_slice(&parent.0);
                segments
            }
            None => Vec::with_capacity(1),
        };
        segments.push(id);
        Self(segments)
    }

    pub fn segments(&self) -> &[PostId] {
        &self.0
    }

    /// Id of the root post heading this subtree.
    pub fn root(&self) -> Option<PostId> {
        self.0.first().copied()
    }

    /// Id of the post this path belongs to.
    pub fn leaf(&self) -> Option<PostId> {
        self.0.last().copied()
    }

    pub fn parent_path(&self) -> Option<PostPath> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self(rest.to_vec())),
            _ => None,
        }
    }

    /// Number of ancestors. Root posts sit at depth 0.
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn is_ancestor_of(&self, other: &PostPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Order-preserving storage key.
    pub fn to_key(&self) -> String {
        let mut key = String::with_capacity(self.0.len() * SEGMENT_WIDTH);
        for id in &self.0 {
            key.push_str(&format!("{:0width$x}", id.get(), width = SEGMENT_WIDTH));
        }
        key
    }

    pub fn from_key(key: &str) -> Result<Self, PathKeyError> {
        if key.len() % SEGMENT_WIDTH != 0 {
            return Err(PathKeyError::Length(key.len()));
        }

        let mut segments = Vec::with_capacity(key.len() / SEGMENT_WIDTH);
        for start in (0..key.len()).step_by(SEGMENT_WIDTH) {
            let chunk = key
                .get(start..start + SEGMENT_WIDTH)
                .ok_or_else(|| PathKeyError::Segment(key.to_owned()))?;
            // `from_str_radix` alone would let a leading `+` through.
            let id = Some(chunk)
                .filter(|c| c.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|c| i64::from_str_radix(c, 16).ok())
                .and_then(PostId::positive)
                .ok_or_else(|| PathKeyError::Segment(chunk.to_owned()))?;
            segments.push(id);
        }

        Ok(Self(segments))
    }
}

impl From<Vec<PostId>> for PostPath {
    fn from(segments: Vec<PostId>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for PostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("]")
    }
}

// SeaORM trait implementations
impl From<PostPath> for Value {
    fn from(path: PostPath) -> Self {
        Value::String(Some(Box::new(path.to_key())))
    }
}

impl TryGetable for PostPath {
    fn try_get_by<I: sea_orm::ColIdx>(res: &QueryResult, idx: I) -> Result<Self, TryGetError> {
        let key = <String as TryGetable>::try_get_by(res, idx)?;
        PostPath::from_key(&key).map_err(|e| TryGetError::DbErr(DbErr::Type(e.to_string())))
    }
}

impl ValueType for PostPath {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(key)) => PostPath::from_key(&key).map_err(|_| ValueTypeErr),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        stringify!(PostPath).to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for PostPath {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(ids: &[i64]) -> PostPath {
        PostPath(ids.iter().copied().map(PostId::new).collect())
    }

    #[test]
    fn test_assign_root_and_reply() {
        let root = PostPath::assign(PostId::new(10), None);
        assert_eq!(root, path(&[10]));

        let reply = PostPath::assign(PostId::new(11), Some(&root));
        let nested = PostPath::assign(PostId::new(12), Some(&reply));
        assert_eq!(nested, path(&[10, 11, 12]));
        assert_eq!(nested.root(), Some(PostId::new(10)));
        assert_eq!(nested.leaf(), Some(PostId::new(12)));
        assert_eq!(nested.parent_path(), Some(reply.clone()));
        assert_eq!(nested.depth(), 2);
        assert_eq!(root.parent_path(), None);
    }

    #[test]
    fn test_ancestry_is_strict_prefix() {
        let a = path(&[10]);
        let b = path(&[10, 11]);
        let other = path(&[13]);

        assert!(a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(!other.is_ancestor_of(&b));
        // [1] must not look like an ancestor of [12] just because "1" prefixes "12"
        assert!(!path(&[1]).is_ancestor_of(&path(&[12, 13])));
    }

    #[test]
    fn test_sorting_yields_pre_order() {
        // 1 ─┬─ 2 ── 5
        //    └─ 3
        // 4 ── 6
        let mut paths = vec![
            path(&[4, 6]),
            path(&[1, 3]),
            path(&[4]),
            path(&[1, 2, 5]),
            path(&[1]),
            path(&[1, 2]),
        ];
        paths.sort();
        let leaves: Vec<i64> = paths.iter().map(|p| p.leaf().unwrap().get()).collect();
        assert_eq!(leaves, vec![1, 2, 5, 3, 4, 6]);
    }

    #[test]
    fn test_key_round_trip_and_errors() {
        let p = path(&[10, 11, 255]);
        let key = p.to_key();
        assert_eq!(key.len(), 48);
        assert_eq!(PostPath::from_key(&key).unwrap(), p);
        assert_eq!(PostPath::from_key(""), Ok(PostPath::default()));
        assert_eq!(PostPath::from_key("abc"), Err(PathKeyError::Length(3)));
        assert!(matches!(
            PostPath::from_key("zzzzzzzzzzzzzzzz"),
            Err(PathKeyError::Segment(_))
        ));
        assert!(matches!(
            PostPath::from_key("0000000000000000"),
            Err(PathKeyError::Segment(_))
        ));
    }

    #[test]
    fn test_key_rejects_signed_segments() {
        assert_eq!(
            PostPath::from_key("+00000000000000a"),
            Err(PathKeyError::Segment("+00000000000000a".to_string()))
        );
        assert_eq!(
            PostPath::from_key("000000000000000a-00000000000000b"),
            Err(PathKeyError::Segment("-00000000000000b".to_string()))
        );
        assert_eq!(
            PostPath::from_key("000000000000000a000000000000000b"),
            Ok(path(&[10, 11]))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(path(&[10, 11, 12]).to_string(), "[10, 11, 12]");
    }

    proptest! {
        #[test]
        fn key_order_matches_path_order(
            a in prop::collection::vec(1i64..=i64::MAX, 1..6),
            b in prop::collection::vec(1i64..=i64::MAX, 1..6),
        ) {
            let (a, b) = (path(&a), path(&b));
            prop_assert_eq!(a.to_key().cmp(&b.to_key()), a.cmp(&b));
        }

        #[test]
        fn assigned_child_sorts_after_parent_and_before_next_sibling(
            parent in prop::collection::vec(1i64..1_000_000, 1..5),
            child in 1i64..1_000_000,
        ) {
            let parent = path(&parent);
            let child_path = PostPath::assign(PostId::new(child), Some(&parent));
            let mut sibling = parent.0.clone();
            if let Some(last) = sibling.last_mut() {
                *last = PostId::new(last.get() + 1);
            }
            let sibling = PostPath(sibling);

            prop_assert!(parent.is_ancestor_of(&child_path));
            prop_assert!(parent.to_key() < child_path.to_key());
            prop_assert!(child_path.to_key() < sibling.to_key());
        }
    }
}
