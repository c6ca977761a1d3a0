use std::fmt;

/// Discrete capabilities a role can grant.
///
/// Discriminants are persisted inside role masks and must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Permission {
    Follow = 1,
    Comment = 2,
    Write = 4,
    Moderate = 8,
    Admin = 16,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::Follow,
        Permission::Comment,
        Permission::Write,
        Permission::Moderate,
        Permission::Admin,
    ];

    pub fn bit(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Permission::Follow => "FOLLOW",
            Permission::Comment => "COMMENT",
            Permission::Write => "WRITE",
            Permission::Moderate => "MODERATE",
            Permission::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitmask of granted permissions as stored on a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet(i32);

impl PermissionSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub fn from_permissions(perms: &[Permission]) -> Self {
        let mut set = Self::empty();
        for perm in perms {
            set.add(*perm);
        }
        set
    }

    pub fn bits(&self) -> i32 {
        self.0
    }

    /// Sets the bit unless it is already present, so repeated adds never
    /// carry into a neighbouring bit.
    pub fn add(&mut self, perm: Permission) {
        if !self.contains(perm) {
            self.0 += perm.bit();
        }
    }

    pub fn remove(&mut self, perm: Permission) {
        if self.contains(perm) {
            self.0 -= perm.bit();
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn contains(&self, perm: Permission) -> bool {
        self.0 & perm.bit() == perm.bit()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.into_iter().filter(|perm| self.contains(*perm))
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Permission::name).collect();
        write!(f, "{} ({})", names.join("|"), self.0)
    }
}

/// A role seeded at bootstrap together with the permissions it grants
pub struct RoleDefinition {
    pub name: &'static str,
    pub permissions: &'static [Permission],
}

pub const ROLE_USER: &str = "User";
pub const ROLE_MODERATOR: &str = "Moderator";
pub const ROLE_ADMINISTRATOR: &str = "Administrator";

pub const DEFAULT_ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: ROLE_USER,
        permissions: &[Permission::Follow, Permission::Comment, Permission::Write],
    },
    RoleDefinition {
        name: ROLE_MODERATOR,
        permissions: &[
            Permission::Follow,
            Permission::Comment,
            Permission::Write,
            Permission::Moderate,
        ],
    },
    RoleDefinition {
        name: ROLE_ADMINISTRATOR,
        permissions: &[
            Permission::Follow,
            Permission::Comment,
            Permission::Write,
            Permission::Moderate,
            Permission::Admin,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_then_contains() {
        for perm in Permission::ALL {
            let mut set = PermissionSet::empty();
            set.add(perm);
            assert!(set.contains(perm));
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set = PermissionSet::empty();
        set.add(Permission::Write);
        let once = set;
        set.add(Permission::Write);

        assert_eq!(set, once);
        assert_eq!(set.bits(), 4);
    }

    #[test]
    fn test_remove_clears_only_present_bit() {
        let mut set = PermissionSet::from_permissions(&[Permission::Follow, Permission::Comment]);
        set.remove(Permission::Comment);
        assert_eq!(set.bits(), 1);

        // Absent bit must not underflow into the mask
        set.remove(Permission::Admin);
        assert_eq!(set.bits(), 1);
    }

    #[test]
    fn test_reset_clears_every_permission() {
        let mut set = PermissionSet::from_permissions(&Permission::ALL);
        set.reset();

        assert!(set.is_empty());
        for perm in Permission::ALL {
            assert!(!set.contains(perm));
        }
    }

    #[test]
    fn test_default_role_masks() {
        let masks: Vec<(&str, i32)> = DEFAULT_ROLES
            .iter()
            .map(|def| (def.name, PermissionSet::from_permissions(def.permissions).bits()))
            .collect();

        assert_eq!(masks, vec![("User", 7), ("Moderator", 15), ("Administrator", 31)]);
    }

    #[test]
    fn test_display_lists_names() {
        let set = PermissionSet::from_permissions(&[Permission::Follow, Permission::Admin]);
        assert_eq!(set.to_string(), "FOLLOW|ADMIN (17)");
    }
}
