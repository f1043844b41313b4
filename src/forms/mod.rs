//! Form Provider integration and the bilingual response pipeline.

pub mod client;
pub mod credentials;
pub mod email;
pub mod index;
pub mod merge;
pub mod model;
pub mod translate;
