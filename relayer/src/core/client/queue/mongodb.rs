use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{bson, Client, Collection, Database};
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{JobQueue, QueueError};
use crate::types::constant::JOBS_COLLECTION;
use crate::types::jobs::job_item::{JobItem, JobRequest};
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::types::JobStatus;
use crate::types::params::MongoParams;

pub trait ToDocument {
    fn to_document(&self) -> Result<Document, QueueError>;
}

impl<T: Serialize> ToDocument for T {
    fn to_document(&self) -> Result<Document, QueueError> {
        let doc = bson::to_bson(self)?;

        if let Bson::Document(doc) = doc {
            Ok(doc)
        } else {
            Err(QueueError::FailedToSerializeDocument(format!("Failed to serialize document: {}", doc)))
        }
    }
}

/// MongoDB backed job queue. A job is claimed by flagging its document, the
/// status itself is left for the worker to advance.
pub struct MongoJobQueue {
    database: Database,
    poll_interval: Duration,
}

impl MongoJobQueue {
    pub async fn new(params: &MongoParams, poll_interval: Duration) -> Result<Self, QueueError> {
        let client = Client::with_uri_str(&params.connection_url).await?;
        let database = client.database(&params.database_name);
        Ok(Self { database, poll_interval })
    }

    fn jobs_collection(&self) -> Collection<JobItem> {
        self.database.collection(JOBS_COLLECTION)
    }

    fn status_bson(status: JobStatus) -> Result<Bson, QueueError> {
        Ok(bson::to_bson(&status)?)
    }

    async fn claim_oldest(&self) -> Result<Option<JobItem>, QueueError> {
        let filter = doc! {
            "status": Self::status_bson(JobStatus::Queued)?,
            "claimed": { "$ne": true },
        };
        let update = doc! { "$set": { "claimed": true } };
        let options = FindOneAndUpdateOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .upsert(false)
            .return_document(ReturnDocument::After)
            .build();
        Ok(self.jobs_collection().find_one_and_update(filter, update, options).await?)
    }
}

#[async_trait]
impl JobQueue for MongoJobQueue {
    async fn enqueue(&self, request: JobRequest) -> Result<JobItem, QueueError> {
        let job = JobItem::new(request);
        self.jobs_collection().insert_one(&job, None).await?;
        debug!(job_id = %job.id, "Job created in MongoDB successfully");
        Ok(job)
    }

    async fn dequeue(&self) -> Result<JobItem, QueueError> {
        loop {
            if let Some(job) = self.claim_oldest().await? {
                debug!(job_id = %job.id, "Claimed queued job");
                return Ok(job);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn update_job(&self, current_job: &JobItem, update: JobItemUpdates) -> Result<JobItem, QueueError> {
        // Filters to search for the job
        let filter = doc! {
            "id": current_job.id,
            "version": current_job.version,
        };
        let options = FindOneAndUpdateOptions::builder().upsert(false).return_document(ReturnDocument::After).build();

        let updates = update.to_document()?;

        // remove null values from the updates
        let mut non_null_updates = Document::new();
        updates.iter().for_each(|(k, v)| {
            if v != &Bson::Null {
                non_null_updates.insert(k, v.clone());
            }
        });

        if non_null_updates.is_empty() {
            return Err(QueueError::NoUpdateFound("No field to be updated, likely a false call".to_string()));
        }

        // Add additional fields that are always updated
        non_null_updates.insert("version", Bson::Int32(current_job.version + 1));
        non_null_updates.insert("updated_at", Bson::DateTime(Utc::now().round_subsecs(0).into()));

        let update = doc! {
            "$set": non_null_updates
        };

        match self.jobs_collection().find_one_and_update(filter, update, options).await? {
            Some(job) => {
                debug!(job_id = %job.id, status = %job.status, "Job updated successfully");
                Ok(job)
            }
            None => {
                warn!(version = %current_job.version, "Failed to update job. Job version is likely outdated");
                Err(QueueError::UpdateFailed(format!("Failed to update job. Identifier - {}, ", current_job.id)))
            }
        }
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobItem>, QueueError> {
        let filter = doc! {
            "id": id
        };
        Ok(self.jobs_collection().find_one(filter, None).await?)
    }

    async fn queued_count(&self) -> Result<u64, QueueError> {
        let filter = doc! {
            "status": Self::status_bson(JobStatus::Queued)?,
            "claimed": { "$ne": true },
        };
        Ok(self.jobs_collection().count_documents(filter, None).await?)
    }

    async fn fail_interrupted(&self, reason: &str) -> Result<u64, QueueError> {
        let in_flight = JobStatus::IN_FLIGHT.into_iter().map(Self::status_bson).collect::<Result<Vec<_>, _>>()?;
        let update = doc! {
            "$set": {
                "status": Self::status_bson(JobStatus::Failed)?,
                "failure_reason": reason,
                "updated_at": Bson::DateTime(Utc::now().round_subsecs(0).into()),
            },
            "$inc": { "version": 1 },
        };
        let failed = self.jobs_collection().update_many(doc! { "status": { "$in": in_flight } }, update, None).await?;

        // claimed before the restart but never accepted, hand them back to `dequeue`
        let released = self
            .jobs_collection()
            .update_many(
                doc! { "status": Self::status_bson(JobStatus::Queued)?, "claimed": true },
                doc! { "$set": { "claimed": false } },
                None,
            )
            .await?;
        debug!(failed = failed.modified_count, released = released.modified_count, "Interrupted jobs recovered");
        Ok(failed.modified_count)
    }
}
