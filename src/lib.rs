//! # mdexplore
//!
//! A markdown document explorer backend. Users upload grouped sets of
//! markdown files ("content groups"); mdexplore persists them and their
//! documents in SQLite and serves AI-generated summaries cached per
//! document, via a JSON HTTP API and the `mdx` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────┐
//! │ CLI /    │──▶│ groups / docs │──▶│  SQLite   │
//! │ HTTP API │   │ summary cache │   │ (sqlx)    │
//! └──────────┘   └──────┬────────┘   └──────────┘
//!                       │ cache miss
//!                       ▼
//!               ┌────────────────┐
//!               │ chat-completion │
//!               │ provider (HTTP) │
//!               └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mdx init                       # create database
//! mdx import ./docs --name Docs  # import a directory as a content group
//! mdx groups                     # list content groups
//! mdx serve                      # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`groups`] | Transactional content-group writer |
//! | [`documents`] | Document accessor |
//! | [`summary`] | Summary cache manager |
//! | [`provider`] | Summarization provider registry |
//! | [`import`] | Filesystem import |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod documents;
pub mod groups;
pub mod import;
pub mod migrate;
pub mod models;
pub mod provider;
pub mod server;
pub mod summary;
