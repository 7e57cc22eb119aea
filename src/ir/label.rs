use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

static NEXT_LABEL: AtomicU32 = AtomicU32::new(0);

/// Branch target identity.
///
/// Every call to [`Label::fresh`] yields a token distinct from all others in
/// the process, so labels built by independent passes never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub fn fresh() -> Self {
        Label(NEXT_LABEL.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}
