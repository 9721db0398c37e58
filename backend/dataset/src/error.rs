use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Invalid object store endpoint: {0}")]
    Endpoint(String),

    #[error("GetObject s3://{bucket}/{key} failed: {message}")]
    Request {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to read object body: {0}")]
    Body(#[from] aws_sdk_s3::primitives::ByteStreamError),

    #[error("Dataset is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Dataset is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing column {0}")]
    MissingColumn(&'static str),

    #[error("Record {record} has {found} fields, header has {expected}")]
    TooManyFields {
        record: usize,
        found: usize,
        expected: usize,
    },
}
