//! `mailsift` extracts bodies, attachments and embedded documents from
//! EML and Outlook MSG email messages into a markdown report.
//!
//! This crate provides the core library: container adapters, part
//! classification, charset recovery, nested document extraction, file
//! materialization, and report assembly.

pub mod charset;
pub mod config;
pub mod error;
pub mod extract;
pub mod materialize;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
