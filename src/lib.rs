//! Survey prompt gating, bilingual form response merging and a submission
//! ledger, served over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod i18n;
pub mod identity;
pub mod ledger;
pub mod responses;
pub mod routes;
pub mod security;
pub mod state;
pub mod survey;
