pub mod engine;
pub mod protocol;
pub mod apply_event;

pub mod brew;
pub mod unlock;
pub mod points_parser;
pub mod prompt_builder;
pub mod llm_client;
