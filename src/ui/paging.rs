use bevy::prelude::*;

/// Slots rendered per page.
pub const PAGE_SIZE: usize = 48;

/// Share of the sentinel that must be inside the viewport to count as visible.
pub const SENTINEL_THRESHOLD: f32 = 0.5;

/// A growing visible prefix over an ordered slot list.
///
/// The page only ever moves forward, one step per visibility signal, and survives
/// changes to the list length so a resized inventory keeps its scroll position.
#[derive(Component, Debug, Default, Clone, PartialEq, Eq)]
pub struct PagedSlotFeed {
    page: usize,
}

impl PagedSlotFeed {
    pub fn page(&self) -> usize {
        self.page
    }

    fn window_end(&self) -> usize {
        self.page.saturating_add(1).saturating_mul(PAGE_SIZE)
    }

    /// Number of slots to render out of `len`.
    pub fn visible_len(&self, len: usize) -> usize {
        self.window_end().min(len)
    }

    /// Index of the slot that triggers the next page: the last one of a full window.
    /// `None` once the window reaches past the end of the list.
    pub fn sentinel_index(&self, len: usize) -> Option<usize> {
        let last = self.window_end() - 1;
        (last < len).then_some(last)
    }

    /// Feed a visibility signal. Advances one page when the sentinel became visible.
    pub fn observe(&mut self, len: usize, became_visible: bool) -> bool {
        if !became_visible || self.sentinel_index(len).is_none() {
            return false;
        }
        self.page += 1;
        true
    }
}

/// Fraction of `target`'s area lying inside `viewport`. Zero-area targets are never visible.
pub fn visible_fraction(target: Rect, viewport: Rect) -> f32 {
    let area = target.width() * target.height();
    if area <= 0.0 {
        return 0.0;
    }
    let overlap = target.intersect(viewport);
    if overlap.is_empty() {
        return 0.0;
    }
    (overlap.width() * overlap.height()) / area
}

/// Marks the slot entity currently acting as the sentinel.
#[derive(Component, Debug, Default)]
pub struct SentinelSlot;

/// Visibility memory for one feed's sentinel. Lives on the scroll container so that
/// rebuilding the slot entities does not replay a transition already seen.
#[derive(Component, Debug, Default)]
pub struct SentinelSensor {
    index: Option<usize>,
    was_visible: bool,
}

impl SentinelSensor {
    /// Point the sensor at a (possibly new) sentinel index. A new index starts hidden.
    pub fn retarget(&mut self, index: Option<usize>) {
        if self.index != index {
            self.index = index;
            self.was_visible = false;
        }
    }

    /// Record a visibility sample; true only on the hidden -> visible edge.
    /// `None` means the sentinel has not been laid out yet and leaves the memory untouched.
    pub fn sample(&mut self, fraction: Option<f32>) -> bool {
        let (Some(_), Some(fraction)) = (self.index, fraction) else {
            return false;
        };
        let visible = fraction >= SENTINEL_THRESHOLD;
        let became_visible = visible && !self.was_visible;
        self.was_visible = visible;
        became_visible
    }
}
