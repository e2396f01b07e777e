use std::collections::HashMap;
use std::fmt;

use super::realm::TestBody;

/// Maps test ids to their executable bodies.
#[derive(Clone, Default)]
pub struct BodyRegistry {
    bodies: HashMap<String, TestBody>,
}

impl fmt::Debug for BodyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bodies of the bundled suite.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::suite::register(&mut registry);
        registry
    }

    /// Binds `body` to `id`, returning the body it replaced.
    pub fn register(&mut self, id: impl Into<String>, body: TestBody) -> Option<TestBody> {
        self.bodies.insert(id.into(), body)
    }

    pub fn get(&self, id: &str) -> Option<TestBody> {
        self.bodies.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.bodies.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
