// handlers/protected/mod.rs - bearer token required
//
// Every handler here receives the caller as `Extension<AuthUser>`. Handlers
// addressed by a sprint or work item id fetch it first to learn its project,
// then run the project check before calling the service.
pub mod projects;
pub mod sprints;
pub mod tags;
pub mod users;
pub mod work_items;
