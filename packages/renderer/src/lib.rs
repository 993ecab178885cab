//! # Pagesmith Renderer
//!
//! Turns a section tree into HTML.
//!
//! Each module is drawn by a [`ModuleView`] resolved from a [`ViewRegistry`]
//! by module name, then category. Views read the module's `defaultProps`
//! plus [`ContentCollections`] supplied by the caller; the layout document
//! itself only holds references into those collections.

mod content;
mod renderer;
mod views;


pub use content::{ContentCollections, Event, Speaker, Ticket};
pub use renderer::{escape_html, render_layout, render_page, Context, RenderOptions};
pub use views::{ModuleView, ViewRegistry};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid content collections: {0}")]
    Content(#[from] serde_json::Error),

    #[error("Module {module}: {message}")]
    View { module: String, message: String },
}

pub type RenderResult<T> = Result<T, RenderError>;
