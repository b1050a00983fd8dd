use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a shared resource.
///
/// Identity, not content, decides whether two submissions reference the same
/// resource. Two shaders compiled from identical source are still distinct.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Common surface of resources that may be held by the handle table.
pub trait SharedResource: Send + Sync + 'static {
    fn id(&self) -> ResourceId;

    fn label(&self) -> &str;

    /// Whether the owner has withdrawn this resource from new submissions.
    fn is_retired(&self) -> bool;
}
