pub mod project;
pub mod sprint;
pub mod tag;
pub mod user;
pub mod work_item;

pub use project::Project;
pub use sprint::Sprint;
pub use tag::Tag;
pub use user::User;
pub use work_item::{WorkItem, WorkItemState};
