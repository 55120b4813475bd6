//! # MicroplasticsWatch
//!
//! Command-line reader and preview server for MicroplasticsWatch: search the
//! research library, read documents page by page with the search term
//! highlighted, browse the whitepaper by chapter, and serve social preview
//! pages for news stories.
//!
//! The reader logic lives in `microplastics-watch-core`; this crate adds the
//! HTTP side (backend client, chapter fetching, axum server) and the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │   Backend    │◀──▶│    ApiClient     │◀──▶│  Controllers │
//! │  /api/...    │    │ LibraryApi+Story │    │ (core crate) │
//! └──────────────┘    └──────────────────┘    └──────┬───────┘
//!                                                    │
//!                        ┌───────────────────────────┤
//!                        ▼                           ▼
//!                   ┌──────────┐              ┌──────────────┐
//!                   │   CLI    │              │    HTTP      │
//!                   │  (mpw)   │              │ /story/{id}  │
//!                   └──────────┘              └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mpw search "nanoplastics"             # search the research library
//! mpw open "/research-library/42?highlight=nanoplastics&page=3"
//! mpw whitepaper --chapter 04-human-exposure
//! mpw serve --corpus data/corpus.json   # local backend + previews
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`api`] | reqwest client for the backend |
//! | [`whitepaper`] | Chapter fetching and `mpw whitepaper` |
//! | [`search`] | `mpw docs` and `mpw search` |
//! | [`view`] | `mpw view` and `mpw open` |
//! | [`preview`] | `mpw preview` |
//! | [`server`] | Preview server and local library backend |
//! | [`logging`] | `tracing` subscriber setup |

pub mod api;
pub mod config;
pub mod logging;
pub mod output;
pub mod preview;
pub mod search;
pub mod server;
pub mod view;
pub mod whitepaper;
