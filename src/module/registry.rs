//! Identity registry: equivalence classes over module names.
//!
//! Every name that has ever been referenced owns a node in an arena. Nodes
//! are linked into classes with union by rank; a class's [`Registration`]
//! lives on its root node only, so merging two classes never copies member
//! data around.

use ahash::RandomState;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::error::ModuleError;

/// The canonical registration attached to an identity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Name under which the class was first registered
    canonical: String,
    /// Load path (absent for a lazy registration)
    path: Option<String>,
}

impl Registration {
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: usize,
    rank: u8,
    registration: Option<Registration>,
}

impl Node {
    fn singleton(index: usize) -> Self {
        Node {
            parent: index,
            rank: 0,
            registration: None,
        }
    }
}

/// Union-find over module names with at most one registration per class.
///
/// A node's arena index is its position in the name map, so interning a
/// name and allocating its node are the same operation.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    nodes: IndexMap<String, Node, RandomState>,
}

impl IdentityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        IdentityRegistry {
            nodes: IndexMap::default(),
        }
    }

    /// Number of names seen so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `name` has been referenced by any `register` or `union` call.
    pub fn is_known(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Register `name`, optionally with a load path.
    ///
    /// The first registration that targets a class fixes its canonical
    /// name. Later calls only fill a path that was previously absent; an
    /// existing path is never overwritten.
    pub fn register(&mut self, name: &str, path: Option<&str>) {
        let index = self.intern(name);
        let root = self.find(index);

        let slot = &mut self.nodes[root].registration;
        match slot {
            None => {
                debug!(name, path, "registered module");
                *slot = Some(Registration {
                    canonical: name.to_string(),
                    path: path.map(str::to_string),
                });
            }
            Some(registration) if registration.path.is_none() && path.is_some() => {
                debug!(
                    name,
                    canonical = %registration.canonical,
                    path,
                    "filled lazy module path"
                );
                registration.path = path.map(str::to_string);
            }
            Some(registration) => {
                trace!(
                    name,
                    canonical = %registration.canonical,
                    "ignored repeated registration"
                );
            }
        }
    }

    /// Merge the classes of `a` and `b`.
    ///
    /// Fails with [`ModuleError::AlreadyRegistered`] when both classes carry
    /// registrations with different canonical names; the registry is left
    /// untouched in that case.
    pub fn union(&mut self, a: &str, b: &str) -> Result<(), ModuleError> {
        // Conflict check first, so a rejected merge allocates nothing.
        if let (Some(left), Some(right)) = (self.root_of_name(a), self.root_of_name(b)) {
            if left == right {
                return Ok(());
            }
            if let (Some(existing), Some(incoming)) = (
                &self.nodes[left].registration,
                &self.nodes[right].registration,
            ) {
                if existing.canonical != incoming.canonical {
                    warn!(
                        a,
                        b,
                        existing = %existing.canonical,
                        incoming = %incoming.canonical,
                        "rejected alias between registered modules"
                    );
                    return Err(ModuleError::already_registered(
                        existing.canonical.clone(),
                        incoming.canonical.clone(),
                    ));
                }
            }
        }

        let a_index = self.intern(a);
        let b_index = self.intern(b);
        let left = self.find(a_index);
        let right = self.find(b_index);
        if left == right {
            return Ok(());
        }

        let (root, child) = if self.nodes[left].rank < self.nodes[right].rank {
            (right, left)
        } else {
            (left, right)
        };
        if self.nodes[root].rank == self.nodes[child].rank {
            self.nodes[root].rank += 1;
        }

        let inherited = self.nodes[child].registration.take();
        self.nodes[child].parent = root;
        if self.nodes[root].registration.is_none() {
            self.nodes[root].registration = inherited;
        }

        debug!(
            a,
            b,
            canonical = self.nodes[root]
                .registration
                .as_ref()
                .map(|r| r.canonical.as_str()),
            "merged module classes"
        );
        Ok(())
    }

    /// The registration of `name`'s class, if any.
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        let root = self.root_of_name(name)?;
        self.nodes[root].registration.as_ref()
    }

    /// All names in `name`'s class, in the order they were first seen.
    pub fn members(&self, name: &str) -> Vec<&str> {
        let Some(root) = self.root_of_name(name) else {
            return Vec::new();
        };

        self.nodes
            .keys()
            .enumerate()
            .filter(|(index, _)| self.root_of(*index) == root)
            .map(|(_, member)| member.as_str())
            .collect()
    }

    /// Discard every class and registration.
    pub fn reset(&mut self) {
        debug!(names = self.nodes.len(), "reset module registry");
        self.nodes.clear();
    }

    /// Index of `name`'s node, creating a singleton class for unseen names.
    fn intern(&mut self, name: &str) -> usize {
        if let Some(index) = self.nodes.get_index_of(name) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.insert(name.to_string(), Node::singleton(index));
        index
    }

    fn root_of_name(&self, name: &str) -> Option<usize> {
        self.nodes.get_index_of(name).map(|index| self.root_of(index))
    }

    /// Walk parent links without compressing them.
    fn root_of(&self, mut index: usize) -> usize {
        loop {
            let parent = self.nodes[index].parent;
            if parent == index {
                return index;
            }
            index = parent;
        }
    }

    /// Find the root of `index`, pointing every node on the way directly at it.
    fn find(&mut self, index: usize) -> usize {
        let root = self.root_of(index);
        let mut current = index;
        while current != root {
            let next = self.nodes[current].parent;
            self.nodes[current].parent = root;
            current = next;
        }
        root
    }
}
