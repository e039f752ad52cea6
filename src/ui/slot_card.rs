/// Upload slot card: preview, file name, pick/clear buttons, drop target
use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, mouse_area, row, text, Space};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::data::SlotKind;
use crate::state::slots::UploadSlot;
use crate::Message;

/// Height of the preview area on every card
pub const PREVIEW_HEIGHT: f32 = 320.0;

/// Per-slot view state that doesn't belong in the session
#[derive(Debug, Clone, Default)]
pub struct SlotView {
    /// Decoded preview of the slot's image
    pub preview: Option<Handle>,
    /// Last upload error for this slot
    pub error: Option<String>,
    /// A file is being read
    pub loading: bool,
    /// Sequence number of the latest upload started for this slot
    pub upload_seq: u64,
}

impl SlotView {
    /// Mark a new upload as in flight and return its sequence number
    pub fn begin_upload(&mut self) -> u64 {
        self.upload_seq += 1;
        self.loading = true;
        self.error = None;
        self.upload_seq
    }

    /// Only the most recently started upload may fill the slot
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.upload_seq
    }

    /// Reset the view. Uploads still in flight become stale.
    pub fn clear(&mut self) {
        let upload_seq = self.upload_seq + 1;
        *self = Self {
            upload_seq,
            ..Self::default()
        };
    }
}

fn hint(kind: SlotKind) -> &'static str {
    match kind {
        SlotKind::Person => "A clear, front-facing photo of the person",
        SlotKind::Clothing => "The garment on a plain background works best",
    }
}

/// Build the card for one slot
pub fn view<'a>(
    kind: SlotKind,
    slot: &'a UploadSlot,
    slot_view: &'a SlotView,
    drop_highlight: bool,
) -> Element<'a, Message> {
    let preview: Element<'a, Message> = match &slot_view.preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .content_fit(ContentFit::Contain)
            .into(),
        None => {
            let message = if slot_view.loading {
                "Loading…"
            } else if drop_highlight {
                "Drop the photo here"
            } else {
                "Drop a photo here or choose one below"
            };
            container(text(message).size(14))
                .width(Length::Fill)
                .height(Length::Fixed(PREVIEW_HEIGHT))
                .center_x(Length::Fill)
                .center_y(Length::Fixed(PREVIEW_HEIGHT))
                .into()
        }
    };

    let name = text(slot.name().unwrap_or(hint(kind))).size(13);

    let actions = row![
        button("Choose photo…")
            .on_press(Message::PickFile(kind))
            .padding(8),
        button("Clear")
            .on_press_maybe(slot.is_filled().then_some(Message::ClearSlot(kind)))
            .padding(8),
    ]
    .spacing(8);

    let mut content = column![text(kind.label()).size(22), preview, name, actions]
        .spacing(10)
        .align_x(Alignment::Start);

    if let Some(error) = &slot_view.error {
        content = content.push(text(error).size(13).style(text::danger));
    } else {
        content = content.push(Space::with_height(Length::Fixed(13.0)));
    }

    let card = container(content)
        .padding(16)
        .width(Length::FillPortion(1))
        .style(container::bordered_box);

    mouse_area(card)
        .on_enter(Message::SlotEntered(kind))
        .on_exit(Message::SlotLeft(kind))
        .into()
}
