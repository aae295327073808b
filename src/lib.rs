//! # Variant Forge
//!
//! Upload-triggered image variant pipeline. When an original lands under
//! `original/` in a bucket, the handler derives six variants and writes them
//! back next to it:
//!
//! ```text
//! original/photo.jpg  →  optimized/photo.jpg       fit 1200x1200
//!                        thumbnails/photo.jpg      fit 300x300 (or 300x300 crop)
//!                        sizes/photo-small.jpg     width 320
//!                        sizes/photo-medium.jpg    width 640
//!                        sizes/photo-large.jpg     width 1024
//!                        webp/photo.webp           full size, WebP
//! ```
//!
//! # Pipeline
//!
//! ```text
//! event ─► event::normalize ─► [WorkItem] ─► per item, in order:
//!            plan::check_key ─► ObjectStore::get ─► plan::check_content_type
//!            ─► ImageCodec::decode ─► imaging::render_variants (parallel)
//!            ─► writer::write_variants (parallel)
//! ```
//!
//! Destination keys depend only on the source key, so redelivered events
//! overwrite the same objects. Nothing is ever written under the source
//! prefix, so the handler's own writes never re-trigger it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`event`] | Classifies the inbound event (direct, batch, probe) into work items |
//! | [`plan`] | Eligibility checks and the fixed table of variant specs |
//! | [`imaging`] | Decode once, render each variant via the [`imaging::ImageCodec`] trait |
//! | [`writer`] | Content-type, cache-control and size metadata for each write |
//! | [`handler`] | Drives work items through the pipeline and builds the response |
//! | [`storage`] | [`storage::ObjectStore`] trait and the directory-backed [`storage::FsStore`] |
//! | [`config`] | TOML config layered over stock defaults |
//! | [`output`] | CLI summary formatting |
//!
//! # Failure Model
//!
//! Ineligible objects are skipped and reported. A malformed event gets a 400
//! response. Fetch, decode, encode and write failures abort the whole
//! invocation with a [`handler::HandlerError`]; retrying is left to whatever
//! delivered the event. Variants written before the failure stay written.
//!
//! # Capabilities Are Passed In
//!
//! The codec and the store are parameters of [`handler::handle_event`], never
//! globals. The binary wires [`imaging::RustCodec`] and [`storage::FsStore`];
//! tests wire a recording mock codec and an in-memory store.

pub mod config;
pub mod event;
pub mod handler;
pub mod imaging;
pub mod output;
pub mod plan;
pub mod storage;
pub mod writer;
