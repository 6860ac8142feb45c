use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GROUP: AtomicU64 = AtomicU64::new(1);

/// Scope shared-element identities to one mounted gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    pub(crate) fn allocate() -> Self {
        Self(NEXT_GROUP.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity handed to the shared-element capability to pair a thumbnail
/// with its full-size carousel item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionToken {
    group: GroupId,
    identity: String,
}

impl TransitionToken {
    pub(crate) fn new(group: GroupId, identity: impl Into<String>) -> Self {
        Self {
            group,
            identity: identity.into(),
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// The rendered element currently holding the token for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenHolder {
    Thumbnail,
    CarouselItem { index: usize },
}
