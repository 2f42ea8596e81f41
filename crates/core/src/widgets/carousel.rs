//! Wrap-around carousel index for product sliders.

/// Position of a product slider.
///
/// `index` is the first visible tile; moving past either end wraps around.
/// An empty carousel stays at index 0 and shows nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    visible: usize,
    index: usize,
}

impl Carousel {
    /// A carousel over `len` items showing `visible` at a time, starting at `offset`.
    #[must_use]
    pub const fn new(len: usize, visible: usize, offset: usize) -> Self {
        let index = if len == 0 { 0 } else { offset % len };
        Self {
            len,
            visible,
            index,
        }
    }

    /// Move by `step` tiles (negative moves backwards), wrapping at the ends.
    #[must_use]
    pub fn shift(self, step: i64) -> Self {
        if self.len == 0 {
            return self;
        }
        let len = i64::try_from(self.len).unwrap_or(i64::MAX);
        let current = i64::try_from(self.index).unwrap_or(0);
        let next = (current + step).rem_euclid(len);
        Self {
            index: usize::try_from(next).unwrap_or(0),
            ..self
        }
    }

    /// Advance by one tile.
    #[must_use]
    pub fn next(self) -> Self {
        self.shift(1)
    }

    /// Go back one tile.
    #[must_use]
    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    /// Timer-driven advance; does nothing while the pointer hovers the slider.
    #[must_use]
    pub fn auto_advance(self, hovered: bool) -> Self {
        if hovered { self } else { self.next() }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Item indices currently on screen, in display order.
    ///
    /// Shows at most `len` tiles so a short list is never repeated.
    #[must_use]
    pub fn window(&self) -> Vec<usize> {
        let shown = self.visible.min(self.len);
        (0..shown).map(|i| (self.index + i) % self.len).collect()
    }

    /// Whether there is anything to scroll to.
    #[must_use]
    pub const fn can_scroll(&self) -> bool {
        self.len > self.visible
    }
}
