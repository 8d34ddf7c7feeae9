//! Per-user cap on in-flight narrative generations.
//!
//! A rapid double-submit would otherwise fire two LLM calls for the same
//! user. The guard hands out at most one permit per user id; the permit
//! releases the slot on drop, including on error paths.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct GenerationGuard {
    in_flight: Arc<DashMap<Uuid, ()>>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to reserve the generation slot for a user. Returns `None` when a
    /// generation for that user is already running.
    pub fn try_acquire(&self, user_id: Uuid) -> Option<GenerationPermit> {
        match self.in_flight.entry(user_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(GenerationPermit {
                    in_flight: Arc::clone(&self.in_flight),
                    user_id,
                })
            }
        }
    }
}

pub struct GenerationPermit {
    in_flight: Arc<DashMap<Uuid, ()>>,
    user_id: Uuid,
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_user_is_rejected() {
        let guard = GenerationGuard::new();
        let user = Uuid::new_v4();

        let permit = guard.try_acquire(user);
        assert!(permit.is_some());
        assert!(guard.try_acquire(user).is_none());
    }

    #[test]
    fn slot_frees_on_drop() {
        let guard = GenerationGuard::new();
        let user = Uuid::new_v4();

        drop(guard.try_acquire(user).unwrap());
        assert!(guard.try_acquire(user).is_some());
    }

    #[test]
    fn users_do_not_contend() {
        let guard = GenerationGuard::new();
        let _a = guard.try_acquire(Uuid::new_v4()).unwrap();
        assert!(guard.try_acquire(Uuid::new_v4()).is_some());
    }
}
