use mongodb::bson;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("BSON error: {0}")]
    BsonError(#[from] bson::ser::Error),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    #[error("No update found: {0}")]
    NoUpdateFound(String),

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Failed to find job with id {0}")]
    JobNotFound(Uuid),
}
