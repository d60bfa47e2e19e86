use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    label::Label,
    v_flex,
};

use crate::chat::events::BeginClicked;
use crate::conversation::random_welcome_quote;

/// Onboarding panel shown until the conversation becomes active.
pub struct WelcomePanel {
    quote: SharedString,
}

impl EventEmitter<BeginClicked> for WelcomePanel {}

impl WelcomePanel {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            quote: SharedString::new_static(random_welcome_quote()),
        }
    }
}

impl Render for WelcomePanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("welcome-panel")
            .size_full()
            .items_center()
            .justify_center()
            .gap_4()
            .p_6()
            .child(
                div()
                    .max_w(px(520.))
                    .italic()
                    .text_color(theme.foreground)
                    .child(Label::new(format!("\u{201c}{}\u{201d}", self.quote))),
            )
            .child(
                Label::new("Share a thought, a problem or a belief. Expect questions, not answers.")
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .child(
                Button::new("begin")
                    .primary()
                    .small()
                    .child("Begin")
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(BeginClicked);
                    })),
            )
    }
}
