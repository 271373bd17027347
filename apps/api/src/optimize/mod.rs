pub mod handlers;
pub mod normalizer;
pub mod service;
