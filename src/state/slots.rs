/// Upload slots and the readiness gate
use super::data::{EncodedImage, SlotKind};

/// Holds at most one accepted image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSlot {
    image: Option<EncodedImage>,
    /// File name shown on the slot card
    name: Option<String>,
}

impl UploadSlot {
    /// Store an image, replacing whatever was there
    pub fn set(&mut self, image: EncodedImage, name: impl Into<String>) {
        self.image = Some(image);
        self.name = Some(name.into());
    }

    pub fn get(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.name = None;
    }

    pub fn is_filled(&self) -> bool {
        self.image.is_some()
    }
}

/// The person and clothing slots together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    pub person: UploadSlot,
    pub clothing: UploadSlot,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, kind: SlotKind) -> &UploadSlot {
        match kind {
            SlotKind::Person => &self.person,
            SlotKind::Clothing => &self.clothing,
        }
    }

    pub fn slot_mut(&mut self, kind: SlotKind) -> &mut UploadSlot {
        match kind {
            SlotKind::Person => &mut self.person,
            SlotKind::Clothing => &mut self.clothing,
        }
    }

    /// Readiness gate: generation needs both photos
    pub fn is_ready(&self) -> bool {
        self.person.is_filled() && self.clothing.is_filled()
    }
}
