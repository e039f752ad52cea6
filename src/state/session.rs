/// The try-on session: both upload slots plus the result lifecycle
///
/// The window owns exactly one `Session`. Every user action goes through
/// it, so the gate and lifecycle rules can be tested without a window.
use super::data::{EncodedImage, SlotKind};
use super::lifecycle::{Lifecycle, LifecycleEvent, Transition};
use super::slots::{Slots, UploadSlot};
use crate::error::TryOnError;
use crate::request::{self, GenerationRequest};

#[derive(Debug, Default)]
pub struct Session {
    slots: Slots,
    lifecycle: Lifecycle,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn slot(&self, kind: SlotKind) -> &UploadSlot {
        self.slots.slot(kind)
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Store the outcome of encoding a file.
    ///
    /// On error the slot keeps its previous image and the error is handed
    /// back for display on that slot.
    pub fn accept_upload(
        &mut self,
        kind: SlotKind,
        name: impl Into<String>,
        encoded: Result<EncodedImage, TryOnError>,
    ) -> Result<(), TryOnError> {
        let image = encoded?;
        self.slots.slot_mut(kind).set(image, name);
        self.sync_gate();
        Ok(())
    }

    pub fn clear_slot(&mut self, kind: SlotKind) {
        self.slots.slot_mut(kind).clear();
        self.sync_gate();
    }

    /// Readiness gate
    pub fn is_ready(&self) -> bool {
        self.slots.is_ready()
    }

    pub fn generate_enabled(&self) -> bool {
        self.lifecycle.generate_enabled()
    }

    pub fn download_enabled(&self) -> bool {
        self.lifecycle.download_enabled()
    }

    pub fn result(&self) -> Option<&EncodedImage> {
        self.lifecycle.result()
    }

    /// Enter `Generating` and return the request to send.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, TryOnError> {
        if self.lifecycle.is_generating() {
            return Err(TryOnError::Busy);
        }
        let request = request::build(&self.slots)?;

        let gate_ready = self.slots.is_ready();
        match self.lifecycle.apply(LifecycleEvent::GenerateRequested { gate_ready }) {
            Transition::Started => Ok(request),
            // build() succeeded so the gate is open; only a busy machine refuses
            _ => Err(TryOnError::Busy),
        }
    }

    /// Feed the remote call's outcome into the lifecycle
    pub fn finish_generation(&mut self, outcome: Result<EncodedImage, TryOnError>) -> Transition {
        let event = match outcome {
            Ok(image) => LifecycleEvent::GenerationSucceeded(image),
            Err(err) => {
                log::warn!("Generation failed: {}", err);
                LifecycleEvent::GenerationFailed(err.to_string())
            }
        };
        self.lifecycle.apply(event)
    }

    /// Start over: empty both slots and drop any result
    pub fn reset(&mut self) -> Result<(), TryOnError> {
        if !self.lifecycle.reset() {
            return Err(TryOnError::Busy);
        }
        self.slots = Slots::new();
        self.sync_gate();
        Ok(())
    }

    fn sync_gate(&mut self) {
        let gate_ready = self.slots.is_ready();
        self.lifecycle.apply(LifecycleEvent::SlotsChanged { gate_ready });
    }
}
