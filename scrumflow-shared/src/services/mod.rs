/// Service layer
///
/// Business operations over the models. Each mutating operation runs in a
/// single transaction and either fully applies or leaves no trace.
///
/// Services do not check access rights: handlers call the guards in
/// [`crate::auth::authorization`] first, then the service.
///
/// - `projects`: project CRUD and visibility queries
/// - `members`: project membership
/// - `stories`: sprints, backlogs and user stories
/// - `users`: registration and credential checks

pub mod members;
pub mod projects;
pub mod stories;
pub mod users;
