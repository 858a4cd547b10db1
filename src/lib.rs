//! # CRO Lens
//!
//! Fetches a web page, asks a generative model for a structured
//! conversion-rate-optimization (CRO) report, stores the result, and serves
//! a searchable history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │  Fetch / │──▶│  Prompt   │──▶│  Model   │──▶│  Schema   │──▶│  SQLite  │
//! │ Extract  │   │ (≤8000 ch)│   │ (Gemini) │   │ validate  │   │ reports  │
//! └──────────┘   └───────────┘   └──────────┘   └───────────┘   └────┬─────┘
//!                                                                    │
//!                                  ┌─────────────────────────────────┤
//!                                  ▼                                 ▼
//!                             ┌──────────┐                      ┌──────────┐
//!                             │   CLI    │                      │   HTTP   │
//!                             │  (cro)   │                      │  (axum)  │
//!                             └──────────┘                      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cro init                                  # create database
//! cro analyze https://shop.example.com/     # one-off analysis
//! cro results --filter example.com          # browse history
//! cro serve                                 # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Report data types (both content shapes) |
//! | [`fetch`] | Single-attempt page fetching |
//! | [`extract`] | HTML-to-text strategies |
//! | [`prompt`] | Prompt construction and truncation |
//! | [`model`] | Completion model abstraction |
//! | [`schema`] | Response schemas and output validation |
//! | [`store`] | Report persistence |
//! | [`pipeline`] | End-to-end analysis |
//! | [`results`] | History listing |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod migrate;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod results;
pub mod schema;
pub mod server;
pub mod store;
