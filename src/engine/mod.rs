//! Core clipping engine module

pub mod command;
pub mod copy;
pub mod extractor;
pub mod progress;
pub mod reencode;

pub use extractor::ClipExtractor;
pub use progress::{ExtractionObserver, LogFn, NoopObserver, RecordingObserver};
pub use reencode::{ReencodeClipper, ReencodeProfile};
