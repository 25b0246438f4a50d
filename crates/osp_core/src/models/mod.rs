pub mod document;
pub mod intake;
pub mod request;
pub mod service;
pub mod staff;
