//! Contracts every managed entity type fulfils.

use crate::actor::ActorId;

/// Identity-bearing record managed by a repository.
///
/// The associated types describe the shapes the services pass through to
/// the repository without inspecting them.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name used in log fields and `NotFound` errors.
    const NAME: &'static str;

    /// Payload for creating a record; the repository assigns the id.
    type New: Send + Sync + 'static;

    /// Structured partial update. Only the fields set are applied.
    type Patch: Send + Sync + 'static;

    /// Predicate for listings and bulk mutations.
    type Filter: Default + Send + Sync + 'static;

    fn id(&self) -> u64;
}

/// An entity that can be stored by the in-memory repository.
pub trait Record: Entity {
    /// Builds the stored record from its creation payload.
    fn materialize(id: u64, new: Self::New) -> Self;

    /// Applies `patch` in place, attributing the change to `actor`.
    fn apply(&mut self, patch: &Self::Patch, actor: ActorId);

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Whether `filter` constrains anything at all.
    fn filter_is_empty(filter: &Self::Filter) -> bool;

    /// Sort key for a named column; unknown columns fall back to the id.
    fn sort_key(&self, _column: &str) -> String {
        format!("{:020}", self.id())
    }
}
