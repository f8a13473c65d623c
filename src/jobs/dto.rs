use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Industry, Job, JobPatch, NewJob, PageRequest};
use crate::{auth::dto::is_valid_email, error::AppError};

pub const RESULTS_PER_PAGE: i64 = 10;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

const MISSING_VALUES: &str = "Please enter all values";
const BAD_INDUSTRY: &str = "Please select correct options for industry.";

/// Body of `POST /job/new`. Any `user` field sent by the client is ignored;
/// the owner always comes from the token.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub industry: Option<Vec<String>>,
    pub positions: Option<i32>,
    pub salary: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub posting_date: Option<OffsetDateTime>,
}

impl CreateJobRequest {
    pub fn validate(self) -> Result<NewJob, AppError> {
        let (
            Some(title),
            Some(description),
            Some(email),
            Some(address),
            Some(company),
            Some(industry),
            Some(positions),
            Some(salary),
        ) = (
            non_blank(self.title),
            non_blank(self.description),
            non_blank(self.email),
            non_blank(self.address),
            non_blank(self.company),
            self.industry.filter(|i| !i.is_empty()),
            self.positions,
            self.salary,
        )
        else {
            return Err(AppError::validation(MISSING_VALUES));
        };

        Ok(NewJob {
            title: check_title(title)?,
            description: check_description(description)?,
            email: check_email(email)?,
            address,
            company,
            industry: parse_industry(&industry)?,
            positions: check_positions(positions)?,
            salary: check_salary(salary)?,
            posting_date: self.posting_date.unwrap_or_else(OffsetDateTime::now_utc),
        })
    }
}

/// Body of `PUT /job/:id`. Only the supplied fields are changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub industry: Option<Vec<String>>,
    pub positions: Option<i32>,
    pub salary: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub posting_date: Option<OffsetDateTime>,
}

impl UpdateJobRequest {
    pub fn validate(self) -> Result<JobPatch, AppError> {
        Ok(JobPatch {
            title: self.title.map(|t| check_title(required(t)?)).transpose()?,
            description: self
                .description
                .map(|d| check_description(required(d)?))
                .transpose()?,
            email: self.email.map(|e| check_email(required(e)?)).transpose()?,
            address: self.address.map(required).transpose()?,
            company: self.company.map(required).transpose()?,
            industry: self
                .industry
                .map(|i| {
                    if i.is_empty() {
                        Err(AppError::validation(BAD_INDUSTRY))
                    } else {
                        parse_industry(&i)
                    }
                })
                .transpose()?,
            positions: self.positions.map(check_positions).transpose()?,
            salary: self.salary.map(check_salary).transpose()?,
            posting_date: self.posting_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: String) -> Result<String, AppError> {
    non_blank(Some(value)).ok_or_else(|| AppError::validation(MISSING_VALUES))
}

fn check_title(title: String) -> Result<String, AppError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(
            "Job title can not exceed 100 characters.",
        ));
    }
    Ok(title)
}

fn check_description(description: String) -> Result<String, AppError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(
            "Job description can not exceed 1000 characters.",
        ));
    }
    Ok(description)
}

fn check_email(email: String) -> Result<String, AppError> {
    if !is_valid_email(&email) {
        return Err(AppError::validation("Please add a valid email address."));
    }
    Ok(email)
}

fn check_positions(positions: i32) -> Result<i32, AppError> {
    if positions < 1 {
        return Err(AppError::validation("Positions must be at least 1."));
    }
    Ok(positions)
}

fn check_salary(salary: i64) -> Result<i64, AppError> {
    if salary < 0 {
        return Err(AppError::validation("Salary can not be negative."));
    }
    Ok(salary)
}

fn parse_industry(labels: &[String]) -> Result<Vec<Industry>, AppError> {
    let mut out: Vec<Industry> = Vec::with_capacity(labels.len());
    for label in labels {
        let industry = label
            .parse::<Industry>()
            .map_err(|_| AppError::validation(BAD_INDUSTRY))?;
        if !out.contains(&industry) {
            out.push(industry);
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
}

impl ListJobsQuery {
    /// Pages are 1-based; anything below 1 is treated as the first page.
    pub fn page_request(&self) -> PageRequest {
        let page = self.page.unwrap_or(1).max(1);
        PageRequest {
            limit: RESULTS_PER_PAGE,
            offset: (page - 1).saturating_mul(RESULTS_PER_PAGE),
        }
    }

    pub fn keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "title": "Software Engineer",
            "description": "We are seeking a skilled Software Engineer to join our dynamic team.",
            "email": "example@example.com",
            "address": "123 Main Street, City, State, Zip",
            "company": "Tech Solutions Inc.",
            "industry": ["Information Technology"],
            "positions": 2,
            "salary": 80000,
            "postingDate": "2024-05-12T00:00:00.000Z"
        })
    }

    fn parse(v: serde_json::Value) -> CreateJobRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn full_body_validates() {
        let job = parse(body()).validate().unwrap();
        assert_eq!(job.title, "Software Engineer");
        assert_eq!(job.industry, vec![Industry::InformationTechnology]);
        assert_eq!(job.posting_date.year(), 2024);
    }

    #[test]
    fn posting_date_defaults_to_now() {
        let mut v = body();
        v.as_object_mut().unwrap().remove("postingDate");
        let before = OffsetDateTime::now_utc();
        let job = parse(v).validate().unwrap();
        assert!(job.posting_date >= before);
    }

    #[test]
    fn any_missing_field_is_a_validation_error() {
        for field in ["title", "description", "email", "address", "company", "industry", "positions", "salary"] {
            let mut v = body();
            v.as_object_mut().unwrap().remove(field);
            match parse(v).validate() {
                Err(AppError::Validation(msg)) => assert_eq!(msg, MISSING_VALUES, "field {field}"),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
        assert!(matches!(
            parse(json!({ "title": "nodejs developer" })).validate(),
            Err(AppError::Validation(m)) if m == MISSING_VALUES
        ));
    }

    #[test]
    fn unknown_industry_is_rejected() {
        let mut v = body();
        v["industry"] = json!(["Astrology"]);
        assert!(matches!(
            parse(v).validate(),
            Err(AppError::Validation(m)) if m == BAD_INDUSTRY
        ));
    }

    #[test]
    fn limits_are_enforced() {
        let mut v = body();
        v["title"] = json!("x".repeat(MAX_TITLE_LEN + 1));
        assert!(parse(v).validate().is_err());

        let mut v = body();
        v["positions"] = json!(0);
        assert!(parse(v).validate().is_err());

        let mut v = body();
        v["salary"] = json!(-1);
        assert!(parse(v).validate().is_err());
    }

    #[test]
    fn client_supplied_owner_is_ignored() {
        let mut v = body();
        v["user"] = json!("664067296409e8233abc9f93");
        assert!(parse(v).validate().is_ok());
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let req: UpdateJobRequest =
            serde_json::from_value(json!({ "title": "NodeJs Developer" })).unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(patch.title.as_deref(), Some("NodeJs Developer"));
        assert!(patch.description.is_none());
        assert!(patch.industry.is_none());

        let blank: UpdateJobRequest = serde_json::from_value(json!({ "title": "  " })).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn paging_is_one_based() {
        let q = |page| ListJobsQuery { keyword: None, page };
        assert_eq!(q(None).page_request(), PageRequest { limit: 10, offset: 0 });
        assert_eq!(q(Some(1)).page_request(), PageRequest { limit: 10, offset: 0 });
        assert_eq!(q(Some(3)).page_request(), PageRequest { limit: 10, offset: 20 });
        assert_eq!(q(Some(-4)).page_request(), PageRequest { limit: 10, offset: 0 });
    }

    #[test]
    fn blank_keyword_means_no_filter() {
        let q = ListJobsQuery {
            keyword: Some("  ".into()),
            page: None,
        };
        assert_eq!(q.keyword(), None);
    }
}
