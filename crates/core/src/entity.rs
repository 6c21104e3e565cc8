//! Records with a stable catalog identity.

/// A record identified by its id rather than its contents.
///
/// Two catalog products with the same id are the same product, even if a
/// refetch changed their attributes; snapshots rely on this to refuse
/// duplicate ids.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Identity of the record within its catalog.
    fn id(&self) -> &Self::Id;
}
