//! # MicroplasticsWatch Core
//!
//! Runtime-free logic behind the MicroplasticsWatch reader: the backend
//! read models, search-term highlighting, word pagination, whitepaper
//! chapter navigation, the session store, and the research library and
//! document viewer controllers.
//!
//! Nothing here performs I/O directly. Network access goes through the
//! [`api::LibraryApi`], [`api::StoryApi`] and [`whitepaper::ChapterSource`]
//! traits, implemented over HTTP by the `microplastics-watch` crate and in
//! memory by [`library_backend::LocalLibrary`].

pub mod api;
pub mod chapter;
pub mod error;
pub mod highlight;
pub mod library;
pub mod library_backend;
pub mod models;
pub mod paging;
pub mod preview;
pub mod session;
pub mod viewer;
pub mod whitepaper;
