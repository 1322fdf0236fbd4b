//! Fixed-capacity ring of raw ADC samples.
//!
//! Storage is a stack array of [`MAX_WINDOW`] slots; the configured window
//! length `N` uses the first `N` of them.  All slots start at zero, so until
//! `N` samples have been pushed the window mixes real readings with zeros.
//! [`SampleWindow::is_filled`] lets the caller decide whether to emit in
//! that state.

/// Largest supported window length.
pub const MAX_WINDOW: usize = 64;

pub struct SampleWindow {
    ring: [u16; MAX_WINDOW],
    len: usize,
    head: usize,
    pushed: usize,
}

impl SampleWindow {
    /// A zero-filled window of `len` slots (clamped to `1..=MAX_WINDOW`).
    pub fn new(len: usize) -> Self {
        Self {
            ring: [0; MAX_WINDOW],
            len: len.clamp(1, MAX_WINDOW),
            head: 0,
            pushed: 0,
        }
    }

    /// Overwrite the oldest slot.
    pub fn push(&mut self, raw: u16) {
        self.ring[self.head] = raw;
        self.head = (self.head + 1) % self.len;
        if self.pushed < self.len {
            self.pushed += 1;
        }
    }

    /// Window length N.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: the window has at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `true` once N real samples have been pushed.
    pub fn is_filled(&self) -> bool {
        self.pushed == self.len
    }

    /// Number of real samples currently held (saturates at N).
    pub fn filled(&self) -> usize {
        self.pushed
    }

    /// Private copy of all N slots, in slot order, for the median filter.
    pub fn snapshot(&self) -> heapless::Vec<u16, MAX_WINDOW> {
        let mut copy = heapless::Vec::new();
        // Cannot overflow: len <= MAX_WINDOW.
        let _ = copy.extend_from_slice(&self.ring[..self.len]);
        copy
    }

    /// Zero every slot and restart the fill count.
    pub fn clear(&mut self) {
        self.ring = [0; MAX_WINDOW];
        self.head = 0;
        self.pushed = 0;
    }
}
