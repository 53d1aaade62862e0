//! Collaborator membership decisions for file writes.
//!
//! Every file mutation asks the policy first and gets back an explicit
//! [`MembershipDecision`]; persisting an enrollment is the caller's job.

use crate::error::CoreError;
use crate::project::{Collaborator, CollaboratorRole, Project};
use crate::types::Timestamp;

/// Whether non-members who write files are enrolled as editors.
///
/// Auto-enrollment grants write access to anyone who names a project id,
/// with no capability check. It is on by default to match the behaviour
/// clients already rely on; deployments that need real access control
/// should turn it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipPolicy {
    pub auto_enroll: bool,
}

impl Default for MembershipPolicy {
    fn default() -> Self {
        Self { auto_enroll: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MembershipDecision {
    /// The actor already collaborates with a role that may write.
    Member(CollaboratorRole),
    /// The actor is new and should be added with this entry before the write.
    Enroll(Collaborator),
    /// The write must not happen.
    Deny(String),
}

impl MembershipPolicy {
    /// Decide whether `actor` may write files in `project`.
    pub fn evaluate(&self, project: &Project, actor: &str, now: Timestamp) -> MembershipDecision {
        match project.collaborator(actor) {
            Some(existing) if existing.role.can_write() => MembershipDecision::Member(existing.role),
            Some(_) => MembershipDecision::Deny(format!(
                "User '{actor}' is a viewer on project {} and cannot modify files",
                project.project_id
            )),
            None if self.auto_enroll => MembershipDecision::Enroll(Collaborator {
                user_id: actor.to_string(),
                username: actor.to_string(),
                email: None,
                role: CollaboratorRole::Editor,
                joined_at: now,
            }),
            None => MembershipDecision::Deny(format!(
                "User '{actor}' is not a collaborator on project {}",
                project.project_id
            )),
        }
    }
}

impl MembershipDecision {
    /// Convert into the collaborator to persist, if any, or a `Forbidden` error.
    pub fn into_enrollment(self) -> Result<Option<Collaborator>, CoreError> {
        match self {
            MembershipDecision::Member(_) => Ok(None),
            MembershipDecision::Enroll(collaborator) => Ok(Some(collaborator)),
            MembershipDecision::Deny(reason) => Err(CoreError::Forbidden(reason)),
        }
    }
}
