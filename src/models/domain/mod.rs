pub mod document;
pub mod play_record;
pub mod round;
pub mod session;

pub use document::{Document, DocumentCategory};
pub use play_record::{CompletionReport, PlayRecord, PlayRecordStatus, TerminationReason};
pub use round::{RoundSpec, Submission};
pub use session::{Difficulty, GameType, GeneratedSession, SessionPayload, WordPoolPayload};
