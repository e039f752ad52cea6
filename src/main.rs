use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, text};
use iced::{event, window, Event, Subscription};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod encoder;
mod error;
mod export;
mod gemini;
mod request;
mod state;
mod ui;

use config::GeminiConfig;
use encoder::ImageSource;
use error::TryOnError;
use gemini::{GeminiClient, ImageGenerator};
use state::data::{EncodedImage, SlotKind};
use state::session::Session;
use ui::SlotView;

/// Main application state
struct TryOnStudio {
    /// Slots + result lifecycle
    session: Session,
    /// Remote model, shared with background generation tasks
    generator: Arc<dyn ImageGenerator>,
    person_view: SlotView,
    clothing_view: SlotView,
    /// Decoded preview of the current result
    result_preview: Option<Handle>,
    /// Slot under the cursor, used as the drop target
    hovered_slot: Option<SlotKind>,
    /// A file is being dragged over the window
    file_hovering: bool,
    /// Status message to display to the user
    status: String,
    status_is_error: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose photo…" on a slot
    PickFile(SlotKind),
    /// A file was dropped anywhere on the window
    FileDropped(PathBuf),
    FileHovering(bool),
    SlotEntered(SlotKind),
    SlotLeft(SlotKind),
    /// Background file read finished
    Encoded {
        kind: SlotKind,
        /// Upload sequence number from `SlotView::begin_upload`
        seq: u64,
        name: String,
        result: Result<EncodedImage, TryOnError>,
    },
    ClearSlot(SlotKind),
    /// User clicked "Generate try-on"
    Generate,
    /// The remote call finished
    GenerationFinished(Result<EncodedImage, TryOnError>),
    /// User clicked "Download"
    Download,
    Exported(Result<Option<PathBuf>, TryOnError>),
    StartOver,
}

impl TryOnStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let client = GeminiClient::new(GeminiConfig::from_env());
        log::info!("🎨 Try-On Studio starting with {:?}", client.config());

        let (status, status_is_error) = if client.config().api_key.is_some() {
            ("Add a person photo and a clothing photo to get started.".to_string(), false)
        } else {
            log::warn!("No GEMINI_API_KEY set; generation will fail until one is provided");
            ("GEMINI_API_KEY is not set: generation will fail until it is.".to_string(), true)
        };

        (
            Self::with_generator(Arc::new(client), status, status_is_error),
            Task::none(),
        )
    }

    fn with_generator(generator: Arc<dyn ImageGenerator>, status: String, status_is_error: bool) -> Self {
        TryOnStudio {
            session: Session::new(),
            generator,
            person_view: SlotView::default(),
            clothing_view: SlotView::default(),
            result_preview: None,
            hovered_slot: None,
            file_hovering: false,
            status,
            status_is_error,
        }
    }

    fn slot_view(&self, kind: SlotKind) -> &SlotView {
        match kind {
            SlotKind::Person => &self.person_view,
            SlotKind::Clothing => &self.clothing_view,
        }
    }

    fn slot_view_mut(&mut self, kind: SlotKind) -> &mut SlotView {
        match kind {
            SlotKind::Person => &mut self.person_view,
            SlotKind::Clothing => &mut self.clothing_view,
        }
    }

    fn set_status(&mut self, status: impl Into<String>, is_error: bool) {
        self.status = status.into();
        self.status_is_error = is_error;
    }

    /// Slot a dropped file should land in.
    ///
    /// The hovered slot always wins. Otherwise the first slot that is empty
    /// and not already loading a file, person first.
    fn drop_target(&self) -> SlotKind {
        self.hovered_slot
            .or_else(|| {
                SlotKind::ALL.into_iter().find(|kind| {
                    !self.session.slot(*kind).is_filled() && !self.slot_view(*kind).loading
                })
            })
            .unwrap_or(SlotKind::Person)
    }

    /// Read and encode a file in the background
    fn start_upload(&mut self, kind: SlotKind, path: PathBuf) -> Task<Message> {
        let source = ImageSource::from_path(path);
        let name = source.name();
        log::info!("Loading {} into the {} slot", name, kind.label().to_lowercase());

        let seq = self.slot_view_mut(kind).begin_upload();

        Task::perform(encoder::encode(source), move |result| Message::Encoded {
            kind,
            seq,
            name: name.clone(),
            result,
        })
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile(kind) => {
                // Show the native file picker
                let file = FileDialog::new()
                    .set_title(format!("Select {} Photo", kind.label()))
                    .add_filter("Images", encoder::PICKER_EXTENSIONS)
                    .add_filter("All files", &["*"])
                    .pick_file();

                match file {
                    Some(path) => self.start_upload(kind, path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => {
                self.file_hovering = false;
                let kind = self.drop_target();
                self.start_upload(kind, path)
            }
            Message::FileHovering(hovering) => {
                self.file_hovering = hovering;
                Task::none()
            }
            Message::SlotEntered(kind) => {
                self.hovered_slot = Some(kind);
                Task::none()
            }
            Message::SlotLeft(kind) => {
                if self.hovered_slot == Some(kind) {
                    self.hovered_slot = None;
                }
                Task::none()
            }
            Message::Encoded {
                kind,
                seq,
                name,
                result,
            } => {
                if !self.slot_view(kind).is_current(seq) {
                    log::debug!("Ignoring stale upload of {} into the {} slot", name, kind.label().to_lowercase());
                    return Task::none();
                }

                let preview = result
                    .as_ref()
                    .ok()
                    .and_then(|image| image.decode().ok())
                    .map(Handle::from_bytes);

                let outcome = self.session.accept_upload(kind, name.clone(), result);
                let slot_view = self.slot_view_mut(kind);
                slot_view.loading = false;

                match outcome {
                    Ok(()) => {
                        slot_view.preview = preview;
                        slot_view.error = None;
                        let status = if self.session.is_ready() {
                            "Both photos ready. Press \"Generate try-on\".".to_string()
                        } else {
                            format!("Added {}.", name)
                        };
                        self.set_status(status, false);
                    }
                    Err(err) => {
                        // The slot keeps its previous image
                        log::warn!("Upload rejected: {}", err);
                        slot_view.error = Some(err.to_string());
                    }
                }
                Task::none()
            }
            Message::ClearSlot(kind) => {
                self.session.clear_slot(kind);
                self.slot_view_mut(kind).clear();
                Task::none()
            }
            Message::Generate => match self.session.begin_generation() {
                Ok(request) => {
                    self.result_preview = None;
                    self.set_status("Generating your try-on…", false);

                    let generator = Arc::clone(&self.generator);
                    Task::perform(
                        async move { generator.generate(request).await },
                        Message::GenerationFinished,
                    )
                }
                Err(err) => {
                    self.set_status(err.to_string(), true);
                    Task::none()
                }
            },
            Message::GenerationFinished(result) => {
                let succeeded = result.is_ok();
                self.session.finish_generation(result);

                self.result_preview = self
                    .session
                    .result()
                    .and_then(|image| image.decode().ok())
                    .map(Handle::from_bytes);

                if succeeded {
                    self.set_status("✅ Try-on ready. Use \"Download\" to save it.", false);
                } else {
                    self.set_status("Generation failed. You can change the photos and try again.", true);
                }
                Task::none()
            }
            Message::Download => {
                let content_type = self
                    .session
                    .result()
                    .map(EncodedImage::content_type)
                    .unwrap_or_default();
                let file_name = export::suggested_file_name(content_type, export::export_token());

                let mut dialog = FileDialog::new()
                    .set_title("Save Try-On Result")
                    .set_file_name(file_name);
                if let Some(dir) = export::default_export_dir() {
                    dialog = dialog.set_directory(dir);
                }

                match dialog.save_file() {
                    Some(path) => Task::perform(export::save(self.session.result(), path), Message::Exported),
                    None => Task::none(),
                }
            }
            Message::Exported(result) => {
                match result {
                    Ok(Some(path)) => self.set_status(format!("💾 Saved to {}", path.display()), false),
                    Ok(None) => {}
                    Err(err) => self.set_status(err.to_string(), true),
                }
                Task::none()
            }
            Message::StartOver => {
                match self.session.reset() {
                    Ok(()) => {
                        self.person_view.clear();
                        self.clothing_view.clear();
                        self.result_preview = None;
                        self.set_status("Add a person photo and a clothing photo to get started.", false);
                    }
                    Err(err) => self.set_status(err.to_string(), true),
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let highlight = |kind: SlotKind| self.file_hovering && self.drop_target() == kind;

        let cards = row![
            ui::slot_card::view(
                SlotKind::Person,
                self.session.slot(SlotKind::Person),
                &self.person_view,
                highlight(SlotKind::Person),
            ),
            ui::slot_card::view(
                SlotKind::Clothing,
                self.session.slot(SlotKind::Clothing),
                &self.clothing_view,
                highlight(SlotKind::Clothing),
            ),
            ui::result_panel::view(self.session.lifecycle(), self.result_preview.as_ref()),
        ]
        .spacing(20);

        let actions = row![
            button("Generate try-on")
                .on_press_maybe(self.session.generate_enabled().then_some(Message::Generate))
                .padding(10),
            button("Download")
                .on_press_maybe(self.session.download_enabled().then_some(Message::Download))
                .padding(10),
            button("Start over")
                .on_press_maybe((!self.session.lifecycle().is_generating()).then_some(Message::StartOver))
                .padding(10),
        ]
        .spacing(12);

        let status = if self.status_is_error {
            text(&self.status).size(16).style(text::danger)
        } else {
            text(&self.status).size(16)
        };

        let content = column![
            text("Virtual Try-On Studio").size(40),
            text("Dress a person in any garment: add both photos, then generate.").size(16),
            cards,
            actions,
            status,
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// OS-level drag and drop of files onto the window
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovering(true)),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FileHovering(false)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    // .env may carry GEMINI_API_KEY and RUST_LOG, so load it before the logger
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = dotenv {
        log::debug!("No .env loaded: {}", e);
    }

    iced::application(
        "Virtual Try-On Studio",
        TryOnStudio::update,
        TryOnStudio::view,
    )
    .subscription(TryOnStudio::subscription)
    .theme(TryOnStudio::theme)
    .centered()
    .run_with(TryOnStudio::new)
}
