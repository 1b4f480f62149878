use bcd_core::AstError;

/// All errors that can be returned while typing or dispatching big-map cells.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BigMapError {
    /// The cell did not type against the storage type.
    #[error(transparent)]
    Ast(#[from] AstError),

    /// No storage type is known for the contract under the cell's protocol.
    #[error("no storage type for {address} on {network} under protocol {protocol}")]
    UnknownMetadata {
        address: String,
        network: String,
        protocol: String,
    },

    /// The type at the cell's bin path is not a big map.
    #[error("expected big_map at {path}, found {prim}")]
    NotABigMap { path: String, prim: String },

    /// A pipeline handler accepted the cell and then failed on it.
    #[error("handler {handler} failed: {reason}")]
    Handler { handler: String, reason: String },
}
