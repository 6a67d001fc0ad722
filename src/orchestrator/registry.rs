use std::collections::HashMap;

use super::state::{SurfaceId, SurfaceState};

/// Per-surface state keyed by handle. Surfaces never share state.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, SurfaceState>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) -> SurfaceId {
        let id = SurfaceId::new();
        self.surfaces.insert(id, SurfaceState::new());
        id
    }

    /// Returns the discarded state, if the surface was attached.
    pub fn detach(&mut self, id: SurfaceId) -> Option<SurfaceState> {
        self.surfaces.remove(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&SurfaceState> {
        self.surfaces.get(&id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut SurfaceState> {
        self.surfaces.get_mut(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.attach();
        let b = registry.attach();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        registry.get_mut(a).unwrap().last_raw_text = "draft".into();
        assert_eq!(registry.get(b).unwrap().last_raw_text, "");

        assert!(registry.detach(a).is_some());
        assert!(registry.detach(a).is_none());
        assert!(!registry.contains(a));
    }
}
