/// Router Module Index
///
/// Splits the API by audience. Handlers in `teacher` all take a `teacher_username`
/// query parameter and are rejected with 401 by the service when it is unknown.

/// Routes accessible to anyone (anonymous, read-only).
pub mod public;

/// Routes that require a registered teacher.
pub mod teacher;
