pub mod datetime;
pub mod extraction;
pub mod openai_service;
pub mod prompt_builder;
