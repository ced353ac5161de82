//! The caller identity threaded into every store call, and the ownership
//! rules applied to entries.

use uuid::Uuid;

use crate::{Error, Result, user::User};

/// Who is making a request. Built by the HTTP layer from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub user_id:  Uuid,
  pub is_admin: bool,
}

impl Caller {
  pub fn owns(&self, owner_id: Uuid) -> bool { self.user_id == owner_id }

  /// Reading an entry is owner-only; admins have no override.
  pub fn authorize_read(&self, owner_id: Uuid) -> Result<()> {
    if self.owns(owner_id) { Ok(()) } else { Err(Error::Forbidden) }
  }

  /// Updating an entry is owner-only; admins have no override.
  pub fn authorize_update(&self, owner_id: Uuid) -> Result<()> {
    if self.owns(owner_id) { Ok(()) } else { Err(Error::Forbidden) }
  }

  /// Deleting an entry is allowed to its owner and to any admin.
  pub fn authorize_delete(&self, owner_id: Uuid) -> Result<()> {
    if self.owns(owner_id) || self.is_admin {
      Ok(())
    } else {
      Err(Error::Forbidden)
    }
  }

  /// Gate for the administrative surface; independent of any ownership.
  pub fn require_admin(&self) -> Result<()> {
    if self.is_admin { Ok(()) } else { Err(Error::Forbidden) }
  }
}

impl From<&User> for Caller {
  fn from(user: &User) -> Self {
    Self { user_id: user.id, is_admin: user.is_admin }
  }
}
