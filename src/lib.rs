//! Animated GIF viewer control for egui: a load/playback lifecycle state
//! machine ([`core::GifController`]) over background fetch and decode
//! workers, plus the [`gui::GifView`] widget that binds it to egui.

pub mod core;
pub mod fetch;
pub mod gui;
pub mod playback;
