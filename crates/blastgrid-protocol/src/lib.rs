//! Wire protocol for Blastgrid.
//!
//! This crate defines the vocabulary shared by every other layer:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`]): newtypes that travel on
//!   the wire as plain numbers.
//! - **Input** ([`ClientMessage`], [`Direction`]): everything a client
//!   can ask the server to do.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! Every message is a JSON object of the form
//! `{ "type": "SCREAMING_SNAKE_NAME", "payload": { ... } }`.
//!
//! Outbound messages carry simulation snapshots and change logs, so they
//! are defined next to the room that emits them rather than here.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, Direction, PlayerId, RoomId};
