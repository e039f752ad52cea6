/// Window widgets
///
/// - `slot_card.rs` - one upload slot (person or clothing)
/// - `result_panel.rs` - the generated image, busy indicator or error

pub mod result_panel;
pub mod slot_card;

pub use slot_card::SlotView;
