pub mod backend;
pub mod document_service;
pub mod generation_service;
pub mod hint_service;
pub mod image_resolver;
pub mod play_session_service;
pub mod session_engine;
pub mod word_check;
