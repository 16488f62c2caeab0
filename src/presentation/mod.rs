// Presentation layer - HTTP surface for the renderers
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod router;
