pub mod settings;
pub mod transcript;

pub use settings::{GenerationSettings, Intent, Length, Tone};
pub use transcript::{Speaker, Transcript, Turn};
