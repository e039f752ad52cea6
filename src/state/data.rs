/// Shared data structures for the application state
///
/// These types flow between the encoder, the upload slots, the
/// generation request and the result exporter.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fmt;

/// Content type used when the real type of some bytes can't be detected
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Image bytes in a text-safe (base64) form, paired with their content type.
///
/// The payload and the content type always travel together; the value is
/// replaced wholesale and never edited in place.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    payload: String,
    content_type: String,
}

impl EncodedImage {
    /// Wrap an already-encoded payload.
    /// A blank content type is replaced with the fallback.
    pub fn new(payload: impl Into<String>, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE.to_string()
        } else {
            content_type.trim().to_string()
        };

        Self {
            payload: payload.into(),
            content_type,
        }
    }

    /// Encode raw bytes
    pub fn from_bytes(bytes: &[u8], content_type: impl Into<String>) -> Self {
        Self::new(BASE64.encode(bytes), content_type)
    }

    /// Base64 payload
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decode the payload back to raw bytes (previews, export)
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.payload.as_bytes())
    }

    /// Approximate size of the decoded image in bytes
    pub fn decoded_len(&self) -> usize {
        self.payload.len() / 4 * 3
    }
}

// Payloads are megabytes of base64; keep them out of logs and panics.
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("content_type", &self.content_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Which of the two upload slots an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The photo of the person being dressed
    Person,
    /// The photo of the garment
    Clothing,
}

impl SlotKind {
    pub const ALL: [SlotKind; 2] = [SlotKind::Person, SlotKind::Clothing];

    /// Human-readable label for headings and logs
    pub fn label(&self) -> &'static str {
        match self {
            SlotKind::Person => "Person",
            SlotKind::Clothing => "Clothing",
        }
    }
}
