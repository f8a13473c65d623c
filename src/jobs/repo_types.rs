use std::{fmt, str::FromStr};

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Industry {
    Business,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
    Banking,
    #[serde(rename = "Education/Training")]
    EducationTraining,
    Telecommunication,
    Others,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Business,
        Industry::InformationTechnology,
        Industry::Banking,
        Industry::EducationTraining,
        Industry::Telecommunication,
        Industry::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Industry::Business => "Business",
            Industry::InformationTechnology => "Information Technology",
            Industry::Banking => "Banking",
            Industry::EducationTraining => "Education/Training",
            Industry::Telecommunication => "Telecommunication",
            Industry::Others => "Others",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown industry: {0}")]
pub struct UnknownIndustry(pub String);

impl FromStr for Industry {
    type Err = UnknownIndustry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownIndustry(s.to_string()))
    }
}

/// Job posting as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub email: String,
    pub address: String,
    pub company: String,
    pub industry: Vec<Industry>,
    pub positions: i32,
    pub salary: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub posting_date: OffsetDateTime,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
}

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub email: String,
    pub address: String,
    pub company: String,
    pub industry: Vec<String>,
    pub positions: i32,
    pub salary: i64,
    pub posting_date: OffsetDateTime,
    pub user_id: Uuid,
}

impl TryFrom<JobRow> for Job {
    type Error = UnknownIndustry;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let industry = r
            .industry
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Industry>, _>>()?;
        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            email: r.email,
            address: r.address,
            company: r.company,
            industry,
            positions: r.positions,
            salary: r.salary,
            posting_date: r.posting_date,
            owner_id: r.user_id,
        })
    }
}

/// Validated input for a new posting. The owner is supplied separately.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub email: String,
    pub address: String,
    pub company: String,
    pub industry: Vec<Industry>,
    pub positions: i32,
    pub salary: i64,
    pub posting_date: OffsetDateTime,
}

/// Partial update. `None` leaves the column untouched; there is no way to
/// change the owner.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub industry: Option<Vec<Industry>>,
    pub positions: Option<i32>,
    pub salary: Option<i64>,
    pub posting_date: Option<OffsetDateTime>,
}

impl JobPatch {
    pub fn apply(self, job: &mut Job) {
        if let Some(v) = self.title {
            job.title = v;
        }
        if let Some(v) = self.description {
            job.description = v;
        }
        if let Some(v) = self.email {
            job.email = v;
        }
        if let Some(v) = self.address {
            job.address = v;
        }
        if let Some(v) = self.company {
            job.company = v;
        }
        if let Some(v) = self.industry {
            job.industry = v;
        }
        if let Some(v) = self.positions {
            job.positions = v;
        }
        if let Some(v) = self.salary {
            job.salary = v;
        }
        if let Some(v) = self.posting_date {
            job.posting_date = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Case-insensitive substring match on the title.
    pub keyword: Option<String>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        match &self.keyword {
            Some(k) => job.title.to_lowercase().contains(&k.to_lowercase()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}
