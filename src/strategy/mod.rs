// Signal synthesis
pub mod synthesizer;

pub use synthesizer::{SignalScores, SignalSynthesizer};
