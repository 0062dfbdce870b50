//! Voice dictation: capability gate, Whisper-backed sessions, utterance parsing

mod gate;
mod recorder;
mod spoken;
mod types;
mod whisper;


pub use gate::*;
pub use recorder::*;
pub use spoken::*;
pub use types::*;
pub use whisper::*;
