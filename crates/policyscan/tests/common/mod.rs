//! Shared test utilities for policyscan integration tests.
//!
//! This module provides:
//! - `PdfBuilder` for generating small in-memory PDFs with text and image pages
//! - Fakes for the page renderer, OCR engine and chat completion client

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
