use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LzssError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to open input file: {path}")]
    OpenInput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create output file: {path}")]
    CreateOutput {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The encoder never emits references this short.
    #[error("Invalid match reference (position={position}, length={length}) at input byte {offset}")]
    InvalidReference { position: u16, length: u8, offset: u64 },

    #[error("Match reference (position={position}, length={length}) exceeds history size {available} at input byte {offset}")]
    ReferenceOutOfWindow {
        position: u16,
        length: u8,
        available: usize,
        offset: u64,
    },
}

pub type Result<T> = std::result::Result<T, LzssError>;
