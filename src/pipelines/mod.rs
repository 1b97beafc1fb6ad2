// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  StillImage  │
//! │   (RGBA)     │     │  - RGBA→RGB       │     │ (JPEG / PNG) │
//! │              │     │  - Mirror / scale │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Encoding runs on the blocking pool so an async caller never stalls.

pub mod photo;
