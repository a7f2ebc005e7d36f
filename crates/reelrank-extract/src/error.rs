use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("JSON parse error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("payload of {bytes} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { bytes: usize, limit: usize },

    #[error("payload root is a {kind}, not an object or array")]
    NotStructured { kind: &'static str },
}
