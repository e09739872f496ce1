//! Unified error type for the Blastgrid server.

use blastgrid_protocol::ProtocolError;
use blastgrid_room::RoomError;
use blastgrid_transport::TransportError;

/// Top-level error that wraps the errors of every layer.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BlastgridError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use blastgrid_protocol::{ClientMessage, Codec, JsonCodec};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: BlastgridError = TransportError::InvalidFrame.into();
        assert!(matches!(err, BlastgridError::Transport(_)));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_from_protocol_error() {
        fn decode(data: &[u8]) -> Result<ClientMessage, BlastgridError> {
            Ok(JsonCodec.decode(data)?)
        }
        let err = decode(b"{").unwrap_err();
        assert!(matches!(err, BlastgridError::Protocol(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let err = RoomError::RoomFull(blastgrid_protocol::RoomId(3));
        let err: BlastgridError = err.into();
        assert!(matches!(err, BlastgridError::Room(_)));
        assert_eq!(err.to_string(), "room R-3 is full");
    }
}
