pub mod chart;
pub mod markdown;
pub mod presenter;
pub mod terminal;
pub mod web;
mod web_assets;

pub use presenter::{Presenter, Sender, Surface};
