//! Identity directory: the user registry and its lookup surface.
//!
//! Read-mostly. Registration assigns the numeric id and derives the wallet
//! alias; everything else is lookups consumed by the receiver resolver.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::model::{NewUser, UserId, UserProfile};

/// Error during user registration.
///
/// Phones are deliberately NOT unique (several informal records may share
/// one number; lookups take the first match in id order), but emails and
/// derived wallet aliases are.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, UserProfile>,
    next_id: UserId,
}

/// In-memory user registry.
#[derive(Default)]
pub struct Directory {
    inner: RwLock<Inner>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, assigning the next numeric id and deriving the
    /// wallet alias from phone and bank name when both are present.
    pub fn register(&self, new: NewUser) -> Result<UserProfile, DirectoryError> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if inner.users.values().any(|u| u.email == new.email) {
            return Err(DirectoryError::DuplicateEmail(new.email));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let paythm_id = match (&new.phone, &new.bank_name) {
            (phone, Some(bank)) if !phone.is_empty() => {
                let alias = format!("{phone}@{}", bank_suffix(bank));
                // Aliases must stay unique; a second user with the same
                // phone and bank simply gets none.
                let taken = inner
                    .users
                    .values()
                    .any(|u| u.paythm_id.as_deref() == Some(alias.as_str()));
                (!taken).then_some(alias)
            }
            _ => None,
        };
        let profile = UserProfile {
            id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            bank_name: new.bank_name,
            paythm_id,
        };
        inner.users.insert(id, profile.clone());
        Ok(profile)
    }

    /// Update a user's profile bank name. The wallet alias derived at
    /// registration is left untouched; the funding bridge syncs the mock
    /// bank account's display name on its next use.
    pub fn update_bank_name(
        &self,
        id: UserId,
        bank_name: Option<String>,
    ) -> Option<UserProfile> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let user = inner.users.get_mut(&id)?;
        user.bank_name = bank_name;
        Some(user.clone())
    }

    pub fn find_by_id(&self, id: UserId) -> Option<UserProfile> {
        self.read(|inner| inner.users.get(&id).cloned())
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<UserProfile> {
        self.find(|u| u.paythm_id.as_deref() == Some(alias))
    }

    pub fn find_by_phone(&self, phone: &str) -> Option<UserProfile> {
        self.find(|u| u.phone == phone)
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserProfile> {
        self.find(|u| u.email == email)
    }

    pub fn find_by_name_exact(&self, name: &str) -> Option<UserProfile> {
        self.find(|u| u.full_name.eq_ignore_ascii_case(name))
    }

    pub fn find_by_name_contains(&self, fragment: &str) -> Option<UserProfile> {
        let needle = fragment.to_lowercase();
        self.find(|u| u.full_name.to_lowercase().contains(&needle))
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner)
    }

    /// First user matching the predicate, in ascending id order so ties
    /// resolve the same way every time.
    fn find(&self, pred: impl Fn(&UserProfile) -> bool) -> Option<UserProfile> {
        self.read(|inner| {
            inner
                .users
                .values()
                .filter(|u| pred(u))
                .min_by_key(|u| u.id)
                .cloned()
        })
    }
}

/// Shorten a bank name into the alias domain part: lowercase, strip
/// whitespace, with well-known banks abbreviated ("9000012345@hdfc").
fn bank_suffix(bank: &str) -> String {
    let collapsed: String = bank
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    for (needle, short) in [
        ("statebank", "sbi"),
        ("hdfc", "hdfc"),
        ("icici", "icici"),
        ("axis", "axis"),
        ("kotak", "kotak"),
        ("punjab", "pnb"),
        ("baroda", "bob"),
        ("maharashtra", "bom"),
        ("union", "union"),
        ("central", "cbi"),
        ("indus", "indus"),
        ("idbi", "idbi"),
        ("saraswat", "saraswat"),
        ("cosmos", "cosmos"),
        ("svc", "svc"),
        ("federal", "federal"),
        ("idfc", "idfc"),
        ("yes", "yes"),
    ] {
        if collapsed.contains(needle) {
            return short.to_string();
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, phone: &str, bank: Option<&str>) -> NewUser {
        NewUser {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            bank_name: bank.map(str::to_string),
        }
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let dir = Directory::new();
        let a = dir
            .register(new_user("Rahul Varma", "rahul@paythm.com", "9000012345", None))
            .unwrap();
        let b = dir
            .register(new_user("Priya Sharma", "priya@paythm.com", "9000054321", None))
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn register_derives_alias_from_phone_and_bank() {
        let dir = Directory::new();
        let user = dir
            .register(new_user(
                "Rahul Varma",
                "rahul@paythm.com",
                "9000012345",
                Some("HDFC Bank"),
            ))
            .unwrap();
        assert_eq!(user.paythm_id.as_deref(), Some("9000012345@hdfc"));
    }

    #[test]
    fn register_without_bank_has_no_alias() {
        let dir = Directory::new();
        let user = dir
            .register(new_user("Mom", "mom@paythm.com", "9876543210", None))
            .unwrap();
        assert_eq!(user.paythm_id, None);
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let dir = Directory::new();
        dir.register(new_user("A", "same@paythm.com", "9000000001", None))
            .unwrap();
        let result = dir.register(new_user("B", "same@paythm.com", "9000000002", None));
        assert!(matches!(result, Err(DirectoryError::DuplicateEmail(_))));
    }

    #[test]
    fn shared_phone_resolves_to_first_registered() {
        let dir = Directory::new();
        let first = dir
            .register(new_user("A", "a@paythm.com", "9000000001", None))
            .unwrap();
        dir.register(new_user("B", "b@paythm.com", "9000000001", None))
            .unwrap();
        assert_eq!(dir.find_by_phone("9000000001").unwrap().id, first.id);
    }

    #[test]
    fn colliding_alias_is_not_assigned_twice() {
        let dir = Directory::new();
        let first = dir
            .register(new_user("A", "a@paythm.com", "9000000001", Some("HDFC Bank")))
            .unwrap();
        let second = dir
            .register(new_user("B", "b@paythm.com", "9000000001", Some("HDFC Bank")))
            .unwrap();
        assert_eq!(first.paythm_id.as_deref(), Some("9000000001@hdfc"));
        assert_eq!(second.paythm_id, None);
        assert_eq!(dir.find_by_alias("9000000001@hdfc").unwrap().id, first.id);
    }

    #[test]
    fn lookups_find_registered_user() {
        let dir = Directory::new();
        let user = dir
            .register(new_user(
                "Rahul Varma",
                "rahul@paythm.com",
                "9000012345",
                Some("HDFC Bank"),
            ))
            .unwrap();

        assert_eq!(dir.find_by_id(user.id).unwrap().id, user.id);
        assert_eq!(dir.find_by_alias("9000012345@hdfc").unwrap().id, user.id);
        assert_eq!(dir.find_by_phone("9000012345").unwrap().id, user.id);
        assert_eq!(dir.find_by_email("rahul@paythm.com").unwrap().id, user.id);
        assert_eq!(dir.find_by_name_exact("rahul varma").unwrap().id, user.id);
        assert_eq!(dir.find_by_name_contains("RAHUL").unwrap().id, user.id);
        assert!(dir.find_by_id(999).is_none());
    }

    #[test]
    fn name_ties_resolve_to_lowest_id() {
        let dir = Directory::new();
        let first = dir
            .register(new_user("Kirana Shop", "shop1@paythm.com", "9111122222", None))
            .unwrap();
        dir.register(new_user("Kirana Shop", "shop2@paythm.com", "9111133333", None))
            .unwrap();
        assert_eq!(dir.find_by_name_exact("kirana shop").unwrap().id, first.id);
    }

    #[test]
    fn bank_suffix_abbreviates_known_banks() {
        assert_eq!(bank_suffix("State Bank of India"), "sbi");
        assert_eq!(bank_suffix("HDFC Bank"), "hdfc");
        assert_eq!(bank_suffix("Punjab National Bank"), "pnb");
        assert_eq!(bank_suffix("Bank of Baroda"), "bob");
        assert_eq!(bank_suffix("Bank of Maharashtra"), "bom");
        assert_eq!(bank_suffix("Central Bank of India"), "cbi");
        assert_eq!(bank_suffix("IndusInd Bank"), "indus");
        assert_eq!(bank_suffix("Saraswat Bank"), "saraswat");
        assert_eq!(bank_suffix("IDFC First Bank"), "idfc");
        assert_eq!(bank_suffix("Yes Bank"), "yes");
        // Unknown banks just collapse.
        assert_eq!(bank_suffix("Some Credit Union"), "union");
        assert_eq!(bank_suffix("Greater Bombay Co-op"), "greaterbombayco-op");
    }

    #[test]
    fn update_bank_name_changes_profile_but_not_alias() {
        let dir = Directory::new();
        let user = dir
            .register(new_user(
                "Rahul Varma",
                "rahul@paythm.com",
                "9000012345",
                Some("HDFC Bank"),
            ))
            .unwrap();

        let updated = dir
            .update_bank_name(user.id, Some("ICICI Bank".to_string()))
            .unwrap();
        assert_eq!(updated.bank_name.as_deref(), Some("ICICI Bank"));
        // The alias keeps its registration-time suffix.
        assert_eq!(updated.paythm_id.as_deref(), Some("9000012345@hdfc"));
        assert_eq!(
            dir.find_by_id(user.id).unwrap().bank_name.as_deref(),
            Some("ICICI Bank")
        );

        assert!(dir.update_bank_name(999, None).is_none());
    }
}
