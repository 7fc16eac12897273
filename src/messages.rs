//! Message catalog shared by services and handlers.
//!
//! Every client-visible string lives here so status mapping and wording stay
//! in one place. Variants are grouped by the operation they belong to.

use std::fmt;

/// Entity names used by the generic "not found" messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Project,
    Sprint,
    WorkItem,
    Tag,
}

impl Entity {
    pub fn singular(&self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Project => "Project",
            Entity::Sprint => "Sprint",
            Entity::WorkItem => "Work item",
            Entity::Tag => "Tag",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Entity::User => "Users",
            Entity::Project => "Projects",
            Entity::Sprint => "Sprints",
            Entity::WorkItem => "Work items",
            Entity::Tag => "Tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Generic
    NotFound(Entity),
    NotFoundPlural(Entity),
    InternalServerError,
    DuplicateValue,

    // Authentication
    MissingToken,
    InvalidToken,
    InvalidCredentials,
    LoginSuccessful,

    // Registration
    UsernamePasswordEmailRequired,
    UsernameAlreadyExists,

    // Users
    UserNotFound,
    UsersNotFound,
    AtLeastOneUserFieldRequired,
    NoPermissionToUpdateUser,
    NoPermissionToDeleteUser,
    CannotDeleteUserWithProjects,

    // Password change
    PasswordChangedSuccessfully,
    CurrentPasswordIncorrect,
    NewPasswordMustBeDifferent,
    PasswordMinimumLength,
    NoPermissionToChangePassword,

    // Projects
    ProjectNameRequired,
    ProjectNameExists(String),
    ProjectNoFieldsSpecified,
    NoProjectsFoundForUser,
    ProjectDeleteFailed,
    NoPermissionToAccessProject,
    OnlyOwnerCanUpdate,
    OnlyOwnerCanDelete,
    OnlyOwnerCanAddParticipants,
    OnlyOwnerCanRemoveParticipants,

    // Participants
    AddParticipantSuccess,
    AddParticipantFailed,
    RemoveParticipantSuccess,
    RemoveParticipantFailed,

    // Sprints
    SprintNameRequired,
    SprintNameExists(String),
    SprintNoFieldsSpecified,
    EndDateMustBeAfterStartDate,
    SprintCannotStartInPast,
    InvalidDateRange,
    NoSprintsFoundForProject,
    CannotDeleteSprintWithWorkItems,
    SprintDeleteFailed,
    NoPermissionToAccessSprint,
    OnlyProjectMembersCanModifySprints,

    // Work items
    WorkItemNameRequired,
    ProjectIdRequired,
    WorkItemNoFieldsSpecified,
    InvalidIndex,
    NoWorkItemsFoundForProject,
    WorkItemDeleteFailed,
    WorkItemMovedSuccessfully,
    WorkItemMoveFailed,
    SprintNotInProject,
    IndexUpdatedSuccessfully,
    IndexUpdateFailed,
    NoPermissionToAccessWorkItem,
    OnlyProjectMembersCanModifyWorkItems,

    // Work item assignment and tagging
    UserAssignedSuccess,
    UserUnassignedSuccess,
    AssignmentFailed,
    UnassignmentFailed,
    TagAddedSuccess,
    TagRemovedSuccess,
    AddTagFailed,
    RemoveTagFailed,

    // Tags
    TagNotFound,
    TagsNotFound,
    TagNameRequired,
    TagNameAlreadyExists,
    TagNoNameSpecified,
    TagDeleteFailed,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::NotFound(entity) => write!(f, "Could not find {}.", entity.singular()),
            Message::NotFoundPlural(entity) => write!(f, "No {} found.", entity.plural()),
            Message::InternalServerError => {
                f.write_str("An internal server error occurred. Please try again later.")
            }
            Message::DuplicateValue => f.write_str("A record with the same unique value already exists."),

            Message::MissingToken => f.write_str("Missing Authorization header"),
            Message::InvalidToken => f.write_str("Invalid or expired token"),
            Message::InvalidCredentials => f.write_str("Invalid username or password."),
            Message::LoginSuccessful => f.write_str("Login successful"),

            Message::UsernamePasswordEmailRequired => {
                f.write_str("Username, email, and password must be provided.")
            }
            Message::UsernameAlreadyExists => f.write_str("Username already exists."),

            Message::UserNotFound => f.write_str("User not found."),
            Message::UsersNotFound => f.write_str("No users found."),
            Message::AtLeastOneUserFieldRequired => {
                f.write_str("At least one of username or email must be provided for update.")
            }
            Message::NoPermissionToUpdateUser => f.write_str("You do not have permission to update this user."),
            Message::NoPermissionToDeleteUser => f.write_str("You do not have permission to delete this user."),
            Message::CannotDeleteUserWithProjects => f.write_str("Cannot delete user who owns active projects."),

            Message::PasswordChangedSuccessfully => f.write_str("Password changed successfully."),
            Message::CurrentPasswordIncorrect => f.write_str("Current password is incorrect."),
            Message::NewPasswordMustBeDifferent => {
                f.write_str("New password must be different from the current password.")
            }
            Message::PasswordMinimumLength => f.write_str("New password must be at least 6 characters long."),
            Message::NoPermissionToChangePassword => {
                f.write_str("You do not have permission to change this password.")
            }

            Message::ProjectNameRequired => f.write_str("Project name is required."),
            Message::ProjectNameExists(name) => {
                write!(f, "A project with the name '{}' already exists.", name)
            }
            Message::ProjectNoFieldsSpecified => {
                f.write_str("At least one of name or description must be provided for update.")
            }
            Message::NoProjectsFoundForUser => f.write_str("No projects found for this user."),
            Message::ProjectDeleteFailed => f.write_str("Failed to delete project."),
            Message::NoPermissionToAccessProject => {
                f.write_str("You do not have permission to access this project.")
            }
            Message::OnlyOwnerCanUpdate => f.write_str("Only the project owner can update this project."),
            Message::OnlyOwnerCanDelete => f.write_str("Only the project owner can delete this project."),
            Message::OnlyOwnerCanAddParticipants => f.write_str("Only the project owner can add participants."),
            Message::OnlyOwnerCanRemoveParticipants => {
                f.write_str("Only the project owner can remove participants.")
            }

            Message::AddParticipantSuccess => f.write_str("Participant added successfully."),
            Message::AddParticipantFailed => f.write_str("Failed to add participant."),
            Message::RemoveParticipantSuccess => f.write_str("Participant removed successfully."),
            Message::RemoveParticipantFailed => f.write_str("Failed to remove participant."),

            Message::SprintNameRequired => f.write_str("Sprint name is required."),
            Message::SprintNameExists(name) => {
                write!(f, "A sprint with the name '{}' already exists in this project.", name)
            }
            Message::SprintNoFieldsSpecified => f.write_str("At least one field must be provided for update."),
            Message::EndDateMustBeAfterStartDate => f.write_str("End date must be after start date."),
            Message::SprintCannotStartInPast => f.write_str("Sprint cannot start in the past."),
            Message::InvalidDateRange => f.write_str("Start date must be before end date."),
            Message::NoSprintsFoundForProject => f.write_str("No sprints found for this project."),
            Message::CannotDeleteSprintWithWorkItems => {
                f.write_str("Cannot delete sprint that contains work items.")
            }
            Message::SprintDeleteFailed => f.write_str("Failed to delete sprint."),
            Message::NoPermissionToAccessSprint => f.write_str("You do not have permission to access this sprint."),
            Message::OnlyProjectMembersCanModifySprints => f.write_str("Only project members can modify sprints."),

            Message::WorkItemNameRequired => f.write_str("Work item name is required."),
            Message::ProjectIdRequired => f.write_str("A valid project id is required."),
            Message::WorkItemNoFieldsSpecified => f.write_str("At least one field must be provided for update."),
            Message::InvalidIndex => f.write_str("Index must be zero or greater."),
            Message::NoWorkItemsFoundForProject => f.write_str("No work items found for this project."),
            Message::WorkItemDeleteFailed => f.write_str("Failed to delete work item."),
            Message::WorkItemMovedSuccessfully => f.write_str("Work item moved successfully."),
            Message::WorkItemMoveFailed => f.write_str("Failed to move work item."),
            Message::SprintNotInProject => f.write_str("The sprint does not belong to the work item's project."),
            Message::IndexUpdatedSuccessfully => f.write_str("Work item index updated successfully."),
            Message::IndexUpdateFailed => f.write_str("Failed to update work item index."),
            Message::NoPermissionToAccessWorkItem => {
                f.write_str("You do not have permission to access this work item.")
            }
            Message::OnlyProjectMembersCanModifyWorkItems => {
                f.write_str("Only project members can modify work items.")
            }

            Message::UserAssignedSuccess => f.write_str("User assigned successfully."),
            Message::UserUnassignedSuccess => f.write_str("User unassigned successfully."),
            Message::AssignmentFailed => f.write_str("Failed to assign user to work item."),
            Message::UnassignmentFailed => f.write_str("Failed to unassign user from work item."),
            Message::TagAddedSuccess => f.write_str("Tag added successfully."),
            Message::TagRemovedSuccess => f.write_str("Tag removed successfully."),
            Message::AddTagFailed => f.write_str("Failed to add tag to work item."),
            Message::RemoveTagFailed => f.write_str("Failed to remove tag from work item."),

            Message::TagNotFound => f.write_str("Tag not found."),
            Message::TagsNotFound => f.write_str("No tags found."),
            Message::TagNameRequired => f.write_str("Tag name is required."),
            Message::TagNameAlreadyExists => f.write_str("Tag name already exists."),
            Message::TagNoNameSpecified => f.write_str("New tag name must be specified."),
            Message::TagDeleteFailed => f.write_str("Failed to delete tag."),
        }
    }
}

impl From<Message> for String {
    fn from(message: Message) -> Self {
        message.to_string()
    }
}
