use gpui::{Pixels, ScrollHandle, px};

/// How close to the tail counts as "at the bottom".
const PIN_THRESHOLD: Pixels = px(24.);
/// Offset changes smaller than this are layout jitter, not user scrolling.
const SCROLL_EPSILON: Pixels = px(1.);

/// Distance between the current scroll position and the newest row.
///
/// GPUI scrolls down with negative Y offsets, so the tail sits at `-max_offset`.
pub fn distance_from_bottom(offset_y: Pixels, max_offset: Pixels) -> Pixels {
    if max_offset <= Pixels::ZERO {
        return Pixels::ZERO;
    }
    (offset_y + max_offset).abs()
}

/// Whether the list stays pinned for this frame.
///
/// `scrolled_up_by` is how far the offset moved toward the top since the last frame.
/// A pinned list only unpins when the user scrolls up; an unpinned one re-pins near
/// the tail.
pub fn next_pinned(
    pinned: bool,
    jump_requested: bool,
    scrolled_up_by: Pixels,
    distance: Pixels,
) -> bool {
    if jump_requested {
        return true;
    }
    if pinned {
        return scrolled_up_by <= SCROLL_EPSILON;
    }
    distance <= PIN_THRESHOLD
}

/// Keeps the transcript pinned to its newest entry.
///
/// Each transcript or busy change pins the view again. In between the user may scroll
/// back through history; the pin returns once they scroll back near the tail.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pinned: bool,
    jump_requested: bool,
    last_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pinned: true,
            jump_requested: false,
            last_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.jump_requested = true;
    }

    /// Called once per frame before layout.
    pub fn sync(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;

        self.pinned = next_pinned(
            self.pinned,
            self.jump_requested,
            offset - self.last_offset,
            distance_from_bottom(offset, max_offset),
        );
        self.jump_requested = false;

        if self.pinned {
            self.scroll_handle.scroll_to_bottom();
            self.last_offset = -max_offset.max(Pixels::ZERO);
        } else {
            self.last_offset = offset;
        }
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_always_at_bottom() {
        assert_eq!(distance_from_bottom(px(0.), px(0.)), Pixels::ZERO);
    }

    #[test]
    fn tail_offset_has_zero_distance() {
        assert_eq!(distance_from_bottom(px(-300.), px(300.)), Pixels::ZERO);
    }

    #[test]
    fn scrolled_to_top_is_full_distance_away() {
        assert_eq!(distance_from_bottom(px(0.), px(300.)), px(300.));
    }

    #[test]
    fn pinned_list_survives_content_growth() {
        // New rows grow max_offset; the offset itself has not moved.
        assert!(next_pinned(true, false, Pixels::ZERO, px(120.)));
    }

    #[test]
    fn scrolling_up_unpins_until_back_near_tail() {
        assert!(!next_pinned(true, false, px(80.), px(80.)));
        assert!(!next_pinned(false, false, Pixels::ZERO, px(80.)));
        assert!(next_pinned(false, false, px(-70.), px(10.)));
    }

    #[test]
    fn transcript_change_pins_from_anywhere() {
        assert!(next_pinned(false, true, Pixels::ZERO, px(500.)));
    }
}
