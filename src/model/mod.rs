pub mod character;
pub mod event_result;
pub mod ingredient;
pub mod lab_state;
pub mod llm_decode;
pub mod message;
pub mod potion;
