//! IRC protocol layer: line framing, parsing, dispatch, and the connection loop.

pub mod builder;
pub mod commands;
pub mod connection;
pub mod dispatcher;
pub mod framer;
pub mod message;
pub mod session;
