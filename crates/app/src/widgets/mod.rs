//! Reusable UI widgets.

pub mod drag_drop;

pub use drag_drop::DragDropHandler;
