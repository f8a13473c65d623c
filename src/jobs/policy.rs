use uuid::Uuid;

use super::repo_types::Job;

/// Only the user who created a posting may change or remove it.
pub fn is_owner(job: &Job, user_id: Uuid) -> bool {
    job.owner_id == user_id
}
