//! Seltrans - Selection-driven Translation Assistant
//!
//! Resolves the text a user selected or pointed at, sends it to a configured
//! translation provider, renders the result as markdown and carries out the
//! follow-up actions (copy, insert, replace, dismiss) against a host editor.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod menu;
pub mod task;
pub mod terminal;
pub mod text;
pub mod translate;
