/// Result area: busy indicator, generated image or error message
use iced::widget::image::Handle;
use iced::widget::{column, container, image, text};
use iced::{ContentFit, Element, Length};

use super::slot_card::PREVIEW_HEIGHT;
use crate::state::lifecycle::{Lifecycle, LifecycleState};
use crate::Message;

pub fn view<'a>(lifecycle: &'a Lifecycle, preview: Option<&'a Handle>) -> Element<'a, Message> {
    let body: Element<'a, Message> = match lifecycle.state() {
        LifecycleState::Idle => placeholder("Your try-on will appear here"),
        LifecycleState::Generating => placeholder("⏳ Generating… this can take up to a minute"),
        LifecycleState::Succeeded(_) => match preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(PREVIEW_HEIGHT))
                .content_fit(ContentFit::Contain)
                .into(),
            // The model's bytes didn't decode as an image; it can still be saved
            None => placeholder("Result ready (preview unavailable)"),
        },
        LifecycleState::Failed(message) => container(text(message).size(14).style(text::danger))
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
    };

    container(column![text("Result").size(22), body].spacing(10))
        .padding(16)
        .width(Length::FillPortion(1))
        .style(container::bordered_box)
        .into()
}

fn placeholder<'a>(message: &'a str) -> Element<'a, Message> {
    container(text(message).size(14))
        .width(Length::Fill)
        .height(Length::Fixed(PREVIEW_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(PREVIEW_HEIGHT))
        .into()
}
