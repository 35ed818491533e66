//! Request parameter types, generated at build time from `openapi.json`.
//!
//! Every operation that declares parameters gets a `<OperationId>Params` struct
//! whose fields mirror the declared query parameters. Optional parameters are
//! `Option`s and are left out of the request when `None`.

#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/types.rs"));
