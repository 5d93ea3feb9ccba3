/// Confirmed transition reported by [`Debounce::update`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// Active for this many consecutive samples, not yet confirmed.
    Counting(u16),
    Confirmed,
}

/// Consecutive-sample counter for one input.
///
/// The count saturates instead of wrapping, so a key held forever reports
/// exactly one press. A single inactive sample resets it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Debounce {
    count: u16,
}

impl Debounce {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Feed one sample. A threshold of zero behaves like one.
    pub fn update(&mut self, active: bool, threshold: u16) -> Option<Edge> {
        let threshold = threshold.max(1);
        let previous = self.count;

        if active {
            self.count = previous.saturating_add(1);
            (previous < threshold && self.count >= threshold).then_some(Edge::Pressed)
        } else {
            self.count = 0;
            (previous >= threshold).then_some(Edge::Released)
        }
    }

    pub const fn count(&self) -> u16 {
        self.count
    }

    pub fn state(&self, threshold: u16) -> DebounceState {
        match self.count {
            0 => DebounceState::Idle,
            n if n >= threshold.max(1) => DebounceState::Confirmed,
            n => DebounceState::Counting(n),
        }
    }

    pub fn is_confirmed(&self, threshold: u16) -> bool {
        self.state(threshold) == DebounceState::Confirmed
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
