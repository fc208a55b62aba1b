//! # Tree management: parent/children links and relation queries.
//!
//! The parent owns its children's *membership* (a strong handle in its
//! `children` list), never their lifetime; the child keeps a `Weak` back
//! reference used only for lookup and detachment. A child has at most one
//! parent — attaching to a new parent atomically detaches from the old one.
//!
//! Structural misuse (adding a present child, removing an absent one,
//! linking an ancestor under its own descendant) is a silent no-op.
//!
//! ## Example
//! ```
//! use treevent::Emitter;
//!
//! # fn main() -> Result<(), treevent::EmitError> {
//! let root = Emitter::named("root");
//! let a = Emitter::named("a");
//! let b = Emitter::named("b");
//! root.add_child(&a)?;
//! root.add_child(&b)?;
//!
//! assert_eq!(root.get_children().len(), 2);
//! assert_eq!(a.get_siblings(), vec![b.clone()]);
//! assert_eq!(a.get_parent(), Some(root.clone()));
//! # Ok(())
//! # }
//! ```

use std::rc::Rc;

use serde_json::Value;

use super::Emitter;
use crate::error::EmitError;
use crate::events::names;

fn contains(list: &[Emitter], emitter: &Emitter) -> bool {
    list.iter().any(|e| e.same(emitter))
}

impl Emitter {
    /// Attaches `child` under this emitter.
    ///
    /// No-op if the child is already present, is this emitter itself, or is
    /// one of its ancestors (which would close a cycle). A child owned by
    /// another parent is detached from it first — the old parent observes
    /// `beforeChildRemoved` / `childRemoved`, then this emitter emits
    /// [`names::CHILD_ADDED`] with the child's name as payload.
    pub fn add_child(&self, child: &Emitter) -> Result<(), EmitError> {
        if self.same(child) || self.has_child(child) || child.is_ancestor_of(self) {
            return Ok(());
        }
        if let Some(old_parent) = child.get_parent() {
            old_parent.remove_child(child)?;
        }
        self.inner().borrow_mut().children_mut().push(child.clone());
        child
            .inner()
            .borrow_mut()
            .set_parent(Rc::downgrade(self.inner()));
        self.emit(names::CHILD_ADDED, Value::String(child.name().to_string()))?;
        Ok(())
    }

    /// Detaches `child` if present; silent no-op otherwise.
    ///
    /// Emits [`names::BEFORE_CHILD_REMOVED`] on both the child and this
    /// emitter before unlinking, then [`names::CHILD_REMOVED`] on this
    /// emitter. Listener state on the child is left untouched.
    ///
    /// The notifications fire while the link still exists, so a listener
    /// triggering removal of the same child re-enters here; the nested call
    /// is treated as the usual silent no-op.
    pub fn remove_child(&self, child: &Emitter) -> Result<bool, EmitError> {
        if !self.has_child(child) || !self.begin_removal(child) {
            return Ok(false);
        }
        let outcome = self.notify_and_unlink(child);
        self.end_removal(child);
        outcome.map(|_| true)
    }

    fn notify_and_unlink(&self, child: &Emitter) -> Result<(), EmitError> {
        let child_name = Value::String(child.name().to_string());
        child.emit(names::BEFORE_CHILD_REMOVED, child_name.clone())?;
        self.emit(names::BEFORE_CHILD_REMOVED, child_name.clone())?;

        self.inner()
            .borrow_mut()
            .children_mut()
            .retain(|c| !c.same(child));
        child.inner().borrow_mut().set_parent(std::rc::Weak::new());

        self.emit(names::CHILD_REMOVED, child_name)?;
        Ok(())
    }

    fn begin_removal(&self, child: &Emitter) -> bool {
        let mut inner = self.inner().borrow_mut();
        if contains(inner.removing(), child) {
            return false;
        }
        inner.removing_mut().push(child.clone());
        true
    }

    fn end_removal(&self, child: &Emitter) {
        let mut inner = self.inner().borrow_mut();
        let removing = inner.removing_mut();
        if let Some(pos) = removing.iter().position(|c| c.same(child)) {
            removing.remove(pos);
        }
    }

    /// Detaches this emitter from its parent, if it has one.
    pub fn remove_self(&self) -> Result<bool, EmitError> {
        match self.get_parent() {
            Some(parent) => parent.remove_child(self),
            None => Ok(false),
        }
    }

    /// Detaches every child (each with the usual removal notifications).
    pub fn remove_all_children(&self) -> Result<(), EmitError> {
        for child in self.get_children() {
            self.remove_child(&child)?;
        }
        Ok(())
    }

    /// Copy of the direct children, in attachment order.
    pub fn get_children(&self) -> Vec<Emitter> {
        self.inner().borrow().children().clone()
    }

    /// True iff `child` is a direct child.
    pub fn has_child(&self, child: &Emitter) -> bool {
        contains(self.inner().borrow().children(), child)
    }

    /// True iff this emitter has a (live) parent.
    pub fn has_parent(&self) -> bool {
        self.get_parent().is_some()
    }

    /// The parent, if any.
    pub fn get_parent(&self) -> Option<Emitter> {
        self.inner().borrow().parent()
    }

    /// The parent's other children; empty without a parent.
    pub fn get_siblings(&self) -> Vec<Emitter> {
        match self.get_parent() {
            Some(parent) => parent
                .get_children()
                .into_iter()
                .filter(|c| !c.same(self))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Depth-first collection of all descendants, skipping any subtree
    /// rooted at a node in `exclude`.
    pub fn get_all_children(&self, exclude: &[Emitter]) -> Vec<Emitter> {
        let mut out = Vec::new();
        self.collect_descendants(exclude, &mut out);
        out
    }

    fn collect_descendants(&self, exclude: &[Emitter], out: &mut Vec<Emitter>) {
        for child in self.get_children() {
            if contains(exclude, &child) {
                continue;
            }
            out.push(child.clone());
            child.collect_descendants(exclude, out);
        }
    }

    /// Every emitter reachable from here except this one: siblings and
    /// their subtrees, own descendants, then the parent and (recursively)
    /// its relations. Already-visited nodes are carried in `exclude` so each
    /// emitter appears exactly once. Used by saturating propagation.
    pub fn get_relations(&self, exclude: &[Emitter]) -> Vec<Emitter> {
        let mut visited: Vec<Emitter> = exclude.to_vec();
        visited.push(self.clone());
        let mut out = Vec::new();

        for sibling in self.get_siblings() {
            if contains(&visited, &sibling) {
                continue;
            }
            visited.push(sibling.clone());
            out.push(sibling.clone());
            for descendant in sibling.get_all_children(&visited) {
                visited.push(descendant.clone());
                out.push(descendant);
            }
        }

        for descendant in self.get_all_children(&visited) {
            visited.push(descendant.clone());
            out.push(descendant);
        }

        if let Some(parent) = self.get_parent() {
            if !contains(&visited, &parent) {
                visited.push(parent.clone());
                out.push(parent.clone());
                for relation in parent.get_relations(&visited) {
                    if contains(&visited, &relation) {
                        continue;
                    }
                    visited.push(relation.clone());
                    out.push(relation);
                }
            }
        }

        out
    }

    /// Applies `f` to the parent, if any.
    pub fn call_on_parent<R>(&self, f: impl FnOnce(&Emitter) -> R) -> Option<R> {
        self.get_parent().map(|parent| f(&parent))
    }

    /// Applies `f` to each direct child (snapshot taken up front, so `f`
    /// may mutate the tree).
    pub fn call_on_children<R>(&self, mut f: impl FnMut(&Emitter) -> R) -> Vec<R> {
        self.get_children().iter().map(|c| f(c)).collect()
    }

    /// Applies `f` to each sibling (snapshot taken up front).
    pub fn call_on_siblings<R>(&self, mut f: impl FnMut(&Emitter) -> R) -> Vec<R> {
        self.get_siblings().iter().map(|s| f(s)).collect()
    }

    /// Clears all listeners and detaches from parent and children, breaking
    /// the strong reference cycles a linked tree otherwise keeps alive.
    pub fn shutdown(&self) -> Result<(), EmitError> {
        self.remove_self()?;
        self.remove_all_children()?;
        self.inner().borrow_mut().clear_listeners();
        Ok(())
    }

    fn is_ancestor_of(&self, other: &Emitter) -> bool {
        let mut cursor = other.get_parent();
        while let Some(node) = cursor {
            if node.same(self) {
                return true;
            }
            cursor = node.get_parent();
        }
        false
    }
}
