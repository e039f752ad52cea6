/// Result lifecycle state machine
///
/// Idle → Generating → Succeeded / Failed, re-entrant from any
/// non-generating state. What the window shows (busy indicator, result
/// image, error text) and which actions are enabled are all derived from
/// the current state, so they can't drift apart.
use super::data::EncodedImage;

/// The state the result area is in
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    /// Nothing generated yet
    #[default]
    Idle,
    /// A request is in flight
    Generating,
    /// The model returned an image
    Succeeded(EncodedImage),
    /// The last generation failed; message is shown to the user
    Failed(String),
}

/// Events driving the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The user pressed "Generate"
    GenerateRequested { gate_ready: bool },
    GenerationSucceeded(EncodedImage),
    GenerationFailed(String),
    /// A slot was set or cleared
    SlotsChanged { gate_ready: bool },
}

/// What applying an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entered `Generating`; the caller must issue the remote call
    Started,
    /// Left `Generating` with a success or failure
    Finished,
    /// No state change
    Unchanged,
}

/// Owns the current lifecycle state plus the last known gate value
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: LifecycleState,
    gate_ready: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Apply one event. Total: every (state, event) pair has an outcome.
    pub fn apply(&mut self, event: LifecycleEvent) -> Transition {
        match event {
            LifecycleEvent::SlotsChanged { gate_ready } => {
                self.gate_ready = gate_ready;
                Transition::Unchanged
            }
            LifecycleEvent::GenerateRequested { gate_ready } => {
                self.gate_ready = gate_ready;
                if !gate_ready || self.is_generating() {
                    log::debug!(
                        "Ignoring generate request (gate ready: {}, state: {})",
                        gate_ready,
                        self.state_name()
                    );
                    return Transition::Unchanged;
                }
                // Entering Generating drops any previous result or error
                self.state = LifecycleState::Generating;
                Transition::Started
            }
            LifecycleEvent::GenerationSucceeded(image) => {
                if !self.is_generating() {
                    log::warn!("Stray generation result while {}", self.state_name());
                    return Transition::Unchanged;
                }
                self.state = LifecycleState::Succeeded(image);
                Transition::Finished
            }
            LifecycleEvent::GenerationFailed(message) => {
                if !self.is_generating() {
                    log::warn!("Stray generation failure while {}: {}", self.state_name(), message);
                    return Transition::Unchanged;
                }
                self.state = LifecycleState::Failed(message);
                Transition::Finished
            }
        }
    }

    /// Force the machine back to Idle ("start over").
    /// Returns false while a generation is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_generating() {
            return false;
        }
        self.state = LifecycleState::Idle;
        true
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, LifecycleState::Generating)
    }

    /// Generate is enabled iff the gate is ready and nothing is in flight
    pub fn generate_enabled(&self) -> bool {
        self.gate_ready && !self.is_generating()
    }

    /// Download is enabled iff the last generation succeeded
    pub fn download_enabled(&self) -> bool {
        matches!(self.state, LifecycleState::Succeeded(_))
    }

    /// Whether the busy indicator is shown
    pub fn busy(&self) -> bool {
        self.is_generating()
    }

    pub fn result(&self) -> Option<&EncodedImage> {
        match &self.state {
            LifecycleState::Succeeded(image) => Some(image),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            LifecycleState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            LifecycleState::Idle => "idle",
            LifecycleState::Generating => "generating",
            LifecycleState::Succeeded(_) => "succeeded",
            LifecycleState::Failed(_) => "failed",
        }
    }
}
