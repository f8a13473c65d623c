use std::sync::Arc;

use tracing::warn;

use super::repo_types::Job;
use crate::mailer::{EmailMessage, Mailer};

pub fn job_posted_email(job: &Job) -> EmailMessage {
    let industries = job
        .industry
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    EmailMessage {
        to: job.email.clone(),
        subject: format!("Job posted: {}", job.title),
        body_text: format!(
            "Your posting \"{}\" at {} is live.\n\n\
             Industry: {}\nOpen positions: {}\nSalary: {}\nReference: {}\n",
            job.title, job.company, industries, job.positions, job.salary, job.id
        ),
    }
}

/// Sends the confirmation on a detached task. Delivery failures are logged only.
pub fn notify_job_posted(mailer: Arc<dyn Mailer>, job: &Job) -> tokio::task::JoinHandle<()> {
    let message = job_posted_email(job);
    let job_id = job.id;
    tokio::spawn(async move {
        if let Err(e) = mailer.send(message).await {
            warn!(error = %e, %job_id, "job posted notification failed");
        }
    })
}
