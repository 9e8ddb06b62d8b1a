//! Generic scope stack shared by the type checker and the interpreter.
//!
//! Grounded in `y-lang`'s `typechecker/scope.rs`: a stack of hash-map
//! frames, push on block entry, pop on block exit, lookup walks
//! innermost-to-outermost. Generalized over the payload type so the
//! checker can stack `Type`s and the interpreter can stack `Value`s
//! without duplicating the push/pop/lookup plumbing. The frame stack
//! itself is a `SmallVec`: Pika programs nest blocks a handful of
//! levels deep at most, so the common case never touches the heap for
//! the stack of frames (each frame's own map still heap-allocates, as
//! a hash map must).
use ahash::AHashMap;
use smallvec::SmallVec;

pub struct ScopeStack<T> {
    frames: SmallVec<[AHashMap<String, T>; 8]>,
}

impl<T> ScopeStack<T> {
    /// Starts with one (global) frame already open.
    pub fn new() -> Self {
        let mut frames = SmallVec::new();
        frames.push(AHashMap::new());
        Self { frames }
    }

    pub fn push(&mut self) {
        self.frames.push(AHashMap::new());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "popped the global scope");
        self.frames.pop();
    }

    /// Binds `name` in the innermost frame, shadowing any outer binding.
    pub fn add(&mut self, name: impl Into<String>, value: T) {
        self.frames
            .last_mut()
            .expect("at least one frame is always open")
            .insert(name.into(), value);
    }

    /// Looks up `name` from the innermost frame outward.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// True if `name` is bound in any currently open frame.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True if `name` is bound in the innermost frame specifically —
    /// used to decide whether an assignment rebinds or shadows.
    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.frames
            .last()
            .expect("at least one frame is always open")
            .contains_key(name)
    }
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_innermost_to_outermost() {
        let mut scopes: ScopeStack<i64> = ScopeStack::new();
        scopes.add("x", 1);
        scopes.push();
        scopes.add("y", 2);
        assert_eq!(scopes.get("x"), Some(&1));
        assert_eq!(scopes.get("y"), Some(&2));
        scopes.pop();
        assert_eq!(scopes.get("y"), None);
        assert_eq!(scopes.get("x"), Some(&1));
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut scopes: ScopeStack<i64> = ScopeStack::new();
        scopes.add("x", 1);
        scopes.push();
        scopes.add("x", 2);
        assert_eq!(scopes.get("x"), Some(&2));
        scopes.pop();
        assert_eq!(scopes.get("x"), Some(&1));
    }

    #[test]
    fn exists_in_current_scope_ignores_outer_frames() {
        let mut scopes: ScopeStack<i64> = ScopeStack::new();
        scopes.add("x", 1);
        scopes.push();
        assert!(scopes.exists("x"));
        assert!(!scopes.exists_in_current_scope("x"));
    }
}
