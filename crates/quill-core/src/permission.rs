//! The capability bitmask and role → permission mapping.
//!
//! A role resolves to a fixed set of capability bits assigned at
//! account-provisioning time; every permission check is a bit-test.

use serde::{Deserialize, Serialize};

/// A single named permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability(pub u8);

impl Capability {
  pub const FOLLOW: Capability = Capability(0x01);
  /// Required to post comments, messages, and thumb-ups.
  pub const COMMENT: Capability = Capability(0x02);
  pub const WRITE: Capability = Capability(0x04);
  pub const MODERATE: Capability = Capability(0x08);
  /// Full access, including the management console.
  pub const ADMINISTER: Capability = Capability(0x80);
}

/// The role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Moderator,
  Administrator,
}

impl Role {
  /// The fixed capability bitmask for this role.
  pub fn permissions(self) -> u8 {
    match self {
      Role::User => {
        Capability::FOLLOW.0 | Capability::COMMENT.0 | Capability::WRITE.0
      }
      Role::Moderator => {
        Capability::FOLLOW.0
          | Capability::COMMENT.0
          | Capability::WRITE.0
          | Capability::MODERATE.0
      }
      Role::Administrator => 0xff,
    }
  }

  /// Bit-test: does this role carry `cap`?
  pub fn can(self, cap: Capability) -> bool {
    self.permissions() & cap.0 == cap.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_can_comment_but_not_administer() {
    assert!(Role::User.can(Capability::COMMENT));
    assert!(!Role::User.can(Capability::ADMINISTER));
  }

  #[test]
  fn moderator_gains_moderate_only() {
    assert!(Role::Moderator.can(Capability::MODERATE));
    assert!(!Role::Moderator.can(Capability::ADMINISTER));
  }

  #[test]
  fn administrator_has_every_capability() {
    for cap in [
      Capability::FOLLOW,
      Capability::COMMENT,
      Capability::WRITE,
      Capability::MODERATE,
      Capability::ADMINISTER,
    ] {
      assert!(Role::Administrator.can(cap));
    }
  }
}
