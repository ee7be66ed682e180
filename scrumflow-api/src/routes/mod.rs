/// API route handlers, by resource
///
/// - `health`: database connectivity
/// - `auth`: register, login, refresh
/// - `projects`: project CRUD
/// - `members`: project membership
/// - `sprints`: sprints of a project
/// - `backlog`: product and sprint backlogs
/// - `stories`: single user stories and moves between backlogs
/// - `api`: read-only user/project lookups

use serde::Deserialize;

pub mod api;
pub mod auth;
pub mod backlog;
pub mod health;
pub mod members;
pub mod projects;
pub mod sprints;
pub mod stories;

/// `?page=`; anything unparsable falls back to a valid page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}
