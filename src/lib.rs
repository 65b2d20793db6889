//! # Code Lens
//!
//! An AI-assisted code analysis service. Callers submit source code;
//! Code Lens classifies the input into a size tier, asks an
//! OpenAI-compatible gateway for a tier-shaped structured analysis,
//! normalizes whatever comes back (including prose that is not JSON at
//! all), derives a deterministic 0–100 quality score with an auditable
//! breakdown, stores the record, and returns the assembled result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌─────────┐
//! │ classify │──▶│  prompt  │──▶│  gateway  │──▶│normalize│
//! │ (tier)   │   │ (schema) │   │ (LLM API) │   │ + score │
//! └──────────┘   └──────────┘   └───────────┘   └────┬────┘
//!                                                    │
//!                                   ┌────────────────┤
//!                                   ▼                ▼
//!                              ┌─────────┐     ┌──────────┐
//!                              │ SQLite  │     │   HTTP   │
//!                              │  store  │     │ /analyze │
//!                              └─────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lens init                            # create database
//! lens analyze src/main.rs --user me   # one-shot analysis
//! lens history --user me               # list stored analyses
//! lens serve                           # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`classify`] | Input size classification |
//! | [`prompt`] | Tier-shaped prompt selection |
//! | [`provider`] | Model gateway abstraction |
//! | [`normalize`] | Model output normalization |
//! | [`score`] | Deterministic quality scoring |
//! | [`analyze`] | The end-to-end pipeline |
//! | [`store`] | Analysis persistence |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod analyze;
pub mod classify;
pub mod config;
pub mod db;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod score;
pub mod server;
pub mod store;
