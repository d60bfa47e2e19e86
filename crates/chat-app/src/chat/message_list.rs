use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};

use crate::chat::scroll_manager::ScrollManager;
use crate::conversation::{Role, Transcript};

const BUBBLE_MAX_WIDTH: Pixels = px(640.);
const BUBBLE_PADDING_X: Pixels = px(14.);
const BUBBLE_PADDING_Y: Pixels = px(10.);
pub const PONDERING_TEXT: &str = "Socrates is pondering...";
const SOCRATES_LABEL: &str = "Socrates:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStyle {
    /// Right-aligned accent bubble.
    User,
    /// Left-aligned muted bubble with a speaker label.
    Socrates,
}

/// Everything needed to draw one transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub style: RowStyle,
    pub speaker_label: Option<&'static str>,
    pub content: String,
    pub timestamp: String,
}

/// Maps the transcript to rows, top to bottom. Depends on nothing but the transcript.
pub fn row_presentations(transcript: &Transcript) -> Vec<MessageRow> {
    transcript
        .iter()
        .map(|message| {
            let (style, speaker_label) = match message.role {
                Role::User => (RowStyle::User, None),
                Role::Socrates => (RowStyle::Socrates, Some(SOCRATES_LABEL)),
            };
            MessageRow {
                style,
                speaker_label,
                content: message.content.clone(),
                timestamp: message.timestamp.clone(),
            }
        })
        .collect()
}

pub struct MessageList {
    rows: Vec<MessageRow>,
    busy: bool,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            rows: Vec::new(),
            busy: false,
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn set_transcript(&mut self, transcript: &Transcript, busy: bool, cx: &mut Context<Self>) {
        let changed = transcript.len() != self.rows.len() || busy != self.busy;

        self.rows = row_presentations(transcript);
        self.busy = busy;

        if changed {
            self.scroll_manager.request_scroll_to_bottom();
        }

        cx.notify();
    }

    fn render_row(&self, row: &MessageRow, index: usize, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let content = if row.content.is_empty() {
            " ".to_string()
        } else {
            row.content.clone()
        };

        let (background, foreground) = match row.style {
            RowStyle::User => (theme.accent, theme.accent_foreground),
            RowStyle::Socrates => (theme.muted, theme.foreground),
        };

        let bubble = v_flex()
            .id(("message-row", index))
            .max_w(BUBBLE_MAX_WIDTH)
            .px(BUBBLE_PADDING_X)
            .py(BUBBLE_PADDING_Y)
            .gap_1()
            .rounded_xl()
            .shadow_sm()
            .bg(background)
            .text_color(foreground)
            .child(
                h_flex()
                    .gap_1()
                    .when_some(row.speaker_label, |line, label| {
                        line.child(div().font_weight(FontWeight::BOLD).child(label))
                    })
                    .child(Label::new(content).text_sm()),
            )
            .child(
                Label::new(row.timestamp.clone())
                    .text_xs()
                    .text_color(foreground.opacity(0.6)),
            );

        let column = v_flex().w_full();
        match row.style {
            RowStyle::User => column.items_end(),
            RowStyle::Socrates => column.items_start(),
        }
        .child(bubble)
        .into_any_element()
    }

    fn render_pondering(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex().w_full().items_start().child(
            div()
                .max_w(BUBBLE_MAX_WIDTH)
                .px(BUBBLE_PADDING_X)
                .py(BUBBLE_PADDING_Y)
                .rounded_xl()
                .bg(theme.muted)
                .text_color(theme.muted_foreground)
                .italic()
                .child(Label::new(PONDERING_TEXT).text_sm()),
        )
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.sync();

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.render_row(row, index, cx))
            .collect::<Vec<_>>();

        div().size_full().min_h_0().child(
            v_flex()
                .id("message-list")
                .size_full()
                .overflow_y_scroll()
                .track_scroll(self.scroll_manager.handle())
                .px_4()
                .py_3()
                .gap_4()
                .children(rows)
                .when(self.busy, |list| list.child(self.render_pondering(cx))),
        )
    }
}
