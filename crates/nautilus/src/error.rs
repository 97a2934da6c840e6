#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph contains an edge with a missing endpoint: {edge_id}")]
    MissingEndpoint { edge_id: String },

    #[error("graph contains the node id {node_id} more than once")]
    DuplicateNode { node_id: String },

    #[error("node {node_id} has a negative or non-finite size")]
    InvalidNodeSize { node_id: String },

    #[error("layout root is not a node of the graph: {node_id}")]
    UnknownRoot { node_id: String },

    #[error("invalid layout option `{option}`: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
