//! Locations of compared nodes relative to the comparison root.
//!
//! A [`FieldPath`] is displayed with dots for fields, brackets for indices
//! and braces for map keys: `friends[0].home.address{street}`. Configuration
//! rules are matched against the *rule path* instead, which joins field and
//! key names with dots and drops indices, so a rule on `friends.name` applies
//! to the `name` of every element of `friends`.
//!
//! Paths are persistent: a child shares its parent's nodes, so extending a
//! path costs one allocation whatever its depth.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::rc::Rc;

/// One step from a parent node to a child node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A named field of a structured value.
    Field(String),
    /// A position in an ordered or unordered collection.
    Index(usize),
    /// A key of a key-value container.
    Key(String),
}

struct PathNode {
    parent: Option<Rc<PathNode>>,
    segment: Segment,
    depth: usize,
    /// Filled on first use, then shared with children reached by index.
    rule_path: OnceCell<Rc<str>>,
}

impl PathNode {
    fn rule_path(&self) -> &str {
        if self.rule_path.get().is_none() {
            let mut pending = vec![self];
            let mut cursor = self.parent.as_deref();
            while let Some(node) = cursor {
                if node.rule_path.get().is_some() {
                    break;
                }
                pending.push(node);
                cursor = node.parent.as_deref();
            }
            for node in pending.into_iter().rev() {
                let parent = node.parent.as_deref().and_then(|p| p.rule_path.get()).cloned();
                let rule_path = match (&node.segment, parent) {
                    (Segment::Index(_), Some(parent)) => parent,
                    (Segment::Index(_), None) => Rc::from(""),
                    (Segment::Field(name) | Segment::Key(name), Some(parent)) if !parent.is_empty() => {
                        Rc::from(format!("{parent}.{name}"))
                    }
                    (Segment::Field(name) | Segment::Key(name), _) => Rc::from(name.as_str()),
                };
                let _ = node.rule_path.set(rule_path);
            }
        }
        self.rule_path.get().map_or("", |path| &**path)
    }
}

// Unlinks the parent chain in a loop; dropping it recursively would use one
// stack frame per level.
impl Drop for PathNode {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = match Rc::try_unwrap(node) {
                Ok(mut node) => node.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// Immutable path from the comparison root to a node.
#[derive(Clone, Default)]
pub struct FieldPath {
    last: Option<Rc<PathNode>>,
}

impl FieldPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.last.is_none()
    }

    fn nodes(&self) -> impl Iterator<Item = &PathNode> {
        iter::successors(self.last.as_deref(), |node| node.parent.as_deref())
    }

    /// The segments from the root, in order.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = self.nodes().map(|node| node.segment.clone()).collect();
        segments.reverse();
        segments
    }

    /// Nesting depth (0 for the root).
    pub fn depth(&self) -> usize {
        self.last.as_ref().map_or(0, |node| node.depth)
    }

    /// A new path extended with `segment`.
    pub fn child(&self, segment: Segment) -> Self {
        let node = PathNode {
            parent: self.last.clone(),
            segment,
            depth: self.depth() + 1,
            rule_path: OnceCell::new(),
        };
        Self {
            last: Some(Rc::new(node)),
        }
    }

    /// A new path extended with a field.
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.child(Segment::Field(name.into()))
    }

    /// A new path extended with a collection index.
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    /// A new path extended with a map key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(Segment::Key(key.into()))
    }

    /// The dotted path used to match configuration rules.
    ///
    /// Built once per node, reusing the nearest ancestor's cached value.
    pub fn rule_path(&self) -> &str {
        self.last.as_deref().map_or("", PathNode::rule_path)
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        if self.depth() != other.depth() {
            return false;
        }
        for (a, b) in self.nodes().zip(other.nodes()) {
            if std::ptr::eq(a, b) {
                return true;
            }
            if a.segment != b.segment {
                return false;
            }
        }
        true
    }
}

impl Eq for FieldPath {}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth().hash(state);
        for node in self.nodes() {
            node.segment.hash(state);
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments: Vec<&Segment> = self.nodes().map(|node| &node.segment).collect();
        segments.reverse();
        for (i, segment) in segments.into_iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "{{{key}}}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({:?})", self.to_string())
    }
}

/// Returns `true` if the dotted rule path `path` is `ancestor` or lies
/// beneath it.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || (path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path.as_bytes()[ancestor.len()] == b'.')
}
