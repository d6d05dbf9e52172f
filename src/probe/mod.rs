//! Media probes that answer a single question about a source file

pub mod duration;
pub mod silence;

pub use duration::MediaDurationProbe;
pub use silence::SilenceDetector;
