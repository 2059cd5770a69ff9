//! Flutter bridge crate for Trailgram core.
//!
//! Only `api` is exposed to the FRB code generator.

pub mod api;
