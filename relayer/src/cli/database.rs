use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueBackend {
    /// Jobs are stored in MongoDB and survive restarts
    Mongodb,
    /// Jobs live in process memory
    Memory,
}

/// Parameters used to config MongoDB.
#[derive(Debug, Clone, Args)]
pub struct MongoDbCliArgs {
    /// Where jobs are stored.
    #[arg(env = "RELAYER_QUEUE", long = "queue", value_enum, default_value_t = QueueBackend::Mongodb)]
    pub queue_backend: QueueBackend,

    /// The connection string to the MongoDB server.
    #[arg(env = "RELAYER_MONGODB_CONNECTION_URL", long, default_value = "mongodb://localhost:27017")]
    pub mongodb_connection_url: String,

    /// The name of the database.
    #[arg(env = "RELAYER_DATABASE_NAME", long, default_value = "relayer")]
    pub mongodb_database_name: String,
}
