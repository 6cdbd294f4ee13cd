/// Identifies an in-flight asynchronous request in a deterministic, stable way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);

/// Monotonic epoch used to tell current work from superseded work.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

/// Counter that invalidates everything issued before the last `advance`.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn advance(&mut self) -> Generation {
        self.current = Generation(self.current.0.wrapping_add(1));
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }
}
