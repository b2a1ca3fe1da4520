pub mod document_handler;
pub mod session_handler;

pub use document_handler::{delete_document, get_document, list_documents, upload_document};
pub use session_handler::{
    abandon_session, advance_round, get_hint, get_session, reveal_answer, start_session,
    submit_answer, tick,
};
