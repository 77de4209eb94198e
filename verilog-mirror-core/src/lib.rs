#![doc = "verilog-mirror-core: core pipeline for verilog-mirror."]

//! This crate contains the crawling and mirroring pipeline: the HTTP transport
//! contract, the request governor, the tree walker, the upsert uploader and the
//! driver that sequences repositories.
//!
//! The CLI crate supplies the production [`contract::Transport`] (a `reqwest`
//! client) and the configuration file; everything else lives here.
//!
//! # Usage
//! Build a [`config::MirrorConfig`], hand it and a transport to
//! [`synchronise::synchronise`], and inspect the returned
//! [`report::MirrorReport`].

pub mod api;
pub mod config;
pub mod contract;
pub mod discover;
pub mod fetch;
pub mod governor;
pub mod model;
pub mod process;
pub mod report;
pub mod synchronise;
pub mod upload;
pub mod walk;
