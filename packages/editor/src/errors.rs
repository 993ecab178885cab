//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Layout error: {0}")]
    Parse(#[from] pagesmith_layout::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Validation failed: {0}")]
    Validation(#[from] crate::page::ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Unknown module type: {0}")]
    UnknownModule(String),

    #[error("No page is open for editing")]
    NotReady,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Unknown row layout: {0}")]
    UnknownPreset(String),

    #[error("Cannot delete the last section of a page")]
    LastSection,
}
