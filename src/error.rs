/// Error taxonomy for the try-on pipeline
///
/// Upload errors (`NotAnImage`, `ReadFailure`) are shown on the slot card
/// that produced them. Generation errors (`NoImageReturned`, `Transport`)
/// move the lifecycle into `Failed`. None of them is fatal.
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between picking a file and saving a result.
///
/// Errors are `Clone` because they travel inside iced messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryOnError {
    /// The selected file does not declare an image content type
    #[error("{name} is not an image (type: {declared})")]
    NotAnImage { name: String, declared: String },

    /// The file could not be read from disk
    #[error("Could not read {}: {message}", .path.display())]
    ReadFailure { path: PathBuf, message: String },

    /// A request was built before both slots were filled
    #[error("Add both a person photo and a clothing photo first")]
    IncompleteInput,

    /// The model answered but did not include an image part
    #[error("The model did not return an image{}", reply_suffix(.reply))]
    NoImageReturned { reply: Option<String> },

    /// The request never produced a usable response
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// A generation is already running
    #[error("A try-on is already being generated")]
    Busy,

    /// The result could not be written to disk
    #[error("Could not save {}: {message}", .path.display())]
    ExportFailure { path: PathBuf, message: String },
}

fn reply_suffix(reply: &Option<String>) -> String {
    match reply.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!(". Model said: \"{}\"", text),
        _ => ". Try a clearer person photo or a different garment.".to_string(),
    }
}
