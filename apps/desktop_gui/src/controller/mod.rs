//! Controller layer: UI events, navigation state transitions, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
