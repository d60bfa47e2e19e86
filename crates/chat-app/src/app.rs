use std::path::PathBuf;
use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};

use crate::chat::ChatView;
use crate::settings::SettingsStore;

pub const APP_TITLE: &str = "Socrates";
pub const APP_TAGLINE: &str =
    "The digital philosopher is at your service. Get ready to question your worldview.";

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Header height used until the header has been laid out once.
pub const HEADER_HEIGHT: f32 = 88.0;
/// Status line plus input row height used until the chat view has been laid out once.
pub const INPUT_AREA_HEIGHT: f32 = 100.0;
/// Outer padding applied on every side of the shell.
pub const SHELL_PADDING: f32 = 24.0;
/// Gap between the header and the chat view.
pub const SECTION_GAP: f32 = 16.0;
/// Border drawn on each side of the chat view.
pub const CHAT_VIEW_BORDER: f32 = 1.0;
/// Smallest message region the window is allowed to shrink to.
pub const MIN_SCROLL_REGION_HEIGHT: f32 = 160.0;

/// Vertical space taken by everything except the header, input and message region.
const FIXED_SPACING: f32 = SHELL_PADDING * 2.0 + SECTION_GAP + CHAT_VIEW_BORDER * 2.0;

const _: () = {
    assert!(HEADER_HEIGHT > 0.0);
    assert!(INPUT_AREA_HEIGHT > 0.0);
    assert!(MIN_SCROLL_REGION_HEIGHT > 0.0);
    assert!(SHELL_PADDING >= 0.0 && SECTION_GAP >= 0.0 && CHAT_VIEW_BORDER >= 0.0);
};

/// Height left for the message region once the header, the input area and the fixed
/// shell spacing are taken out of `viewport_height`.
///
/// The result never exceeds the space that is actually there, so the input area always
/// stays visible; it bottoms out at zero.
pub fn compute_scroll_region_height(
    viewport_height: f32,
    header_height: f32,
    input_height: f32,
) -> f32 {
    (viewport_height - header_height - input_height - FIXED_SPACING).max(0.0)
}

/// Window height at which the message region still gets [`MIN_SCROLL_REGION_HEIGHT`].
pub fn min_window_height() -> f32 {
    HEADER_HEIGHT + INPUT_AREA_HEIGHT + FIXED_SPACING + MIN_SCROLL_REGION_HEIGHT
}

/// A laid-out height, or `estimate` when the element has not been measured yet.
pub fn measured_or(measured: Pixels, estimate: f32) -> f32 {
    if measured > Pixels::ZERO {
        measured.into()
    } else {
        estimate
    }
}

gpui::actions!(socrates, [Quit]);

/// Root view: header plus the chat view, resized with the window.
pub struct ChatAppShell {
    chat_view: Entity<ChatView>,
    header_handle: ScrollHandle,
    _bounds_subscription: Subscription,
}

impl ChatAppShell {
    pub fn new(store: Arc<SettingsStore>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = store.settings();
        let chat_view = cx.new(|cx| ChatView::new(&settings, window, cx));

        let bounds_subscription = cx.observe_window_bounds(window, |this, window, cx| {
            this.resize_scroll_region(window, cx);
        });

        // The header is only measurable after its first layout.
        cx.on_next_frame(window, |this, window, cx| {
            this.resize_scroll_region(window, cx);
        });

        let mut this = Self {
            chat_view,
            header_handle: ScrollHandle::new(),
            _bounds_subscription: bounds_subscription,
        };
        this.resize_scroll_region(window, cx);
        this
    }

    /// Hands the viewport and the measured header height to the chat view, which
    /// subtracts its own measured input area.
    fn resize_scroll_region(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let viewport_height: f32 = window.viewport_size().height.into();
        let header_height = measured_or(self.header_handle.bounds().size.height, HEADER_HEIGHT);

        tracing::trace!(viewport_height, header_height, "resized shell");
        self.chat_view.update(cx, |chat_view, cx| {
            chat_view.set_frame_metrics(viewport_height, header_height, cx);
        });
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("shell-header")
            .track_scroll(&self.header_handle)
            .w_full()
            .py_2()
            .flex_shrink_0()
            .items_center()
            .justify_center()
            .gap_1()
            .child(
                div()
                    .text_2xl()
                    .font_weight(FontWeight::BOLD)
                    .text_color(theme.foreground)
                    .child(APP_TITLE),
            )
            .child(
                Label::new(APP_TAGLINE)
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("shell")
            .size_full()
            .p(px(SHELL_PADDING))
            .gap(px(SECTION_GAP))
            .bg(theme.background)
            .child(self.render_header(cx))
            .child(
                div()
                    .id("main-content")
                    .flex_1()
                    .w_full()
                    .min_h_0()
                    .overflow_hidden()
                    .child(self.chat_view.clone()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_takes_remaining_height() {
        let height = compute_scroll_region_height(800.0, 90.0, 99.0);
        assert_eq!(height, 800.0 - 90.0 - 99.0 - FIXED_SPACING);
    }

    #[test]
    fn region_grows_with_viewport() {
        let small = compute_scroll_region_height(700.0, HEADER_HEIGHT, INPUT_AREA_HEIGHT);
        let large = compute_scroll_region_height(900.0, HEADER_HEIGHT, INPUT_AREA_HEIGHT);
        assert_eq!(large - small, 200.0);
    }

    #[test]
    fn small_viewport_keeps_room_for_input() {
        for viewport in [0.0_f32, 120.0, 300.0, 400.0, 640.0] {
            let header = 88.0;
            let input = 101.0;
            let region = compute_scroll_region_height(viewport, header, input);

            assert!(region >= 0.0);
            let chrome = header + input + FIXED_SPACING;
            if viewport >= chrome {
                assert!(header + region + input + FIXED_SPACING <= viewport);
            } else {
                assert_eq!(region, 0.0);
            }
        }
    }

    #[test]
    fn minimum_window_fits_minimum_region() {
        assert_eq!(
            compute_scroll_region_height(min_window_height(), HEADER_HEIGHT, INPUT_AREA_HEIGHT),
            MIN_SCROLL_REGION_HEIGHT
        );
    }

    #[test]
    fn unmeasured_height_falls_back_to_estimate() {
        assert_eq!(measured_or(Pixels::ZERO, HEADER_HEIGHT), HEADER_HEIGHT);
        assert_eq!(measured_or(px(72.), HEADER_HEIGHT), 72.0);
    }

    #[test]
    fn themes_path_is_relative_to_working_directory() {
        assert_eq!(default_themes_path(), PathBuf::from("./themes"));
    }
}
