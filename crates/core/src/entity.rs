//! Entity trait: identity + continuity across snapshots.

/// Entity marker + minimal interface.
///
/// Catalog records are re-created on every fetch; two records with the same
/// id describe the same entity even when their other fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// First entity in `items` whose id equals `id` (exact match).
pub fn find_by_id<E: Entity>(items: &[E], id: E::Id) -> Option<&E> {
    items.iter().find(|item| item.id() == id)
}
