//! Receiver resolution: turning whatever the sender typed into exactly one
//! user.
//!
//! The product accepts many informal addressing schemes (wallet alias,
//! phone, numeric id, `left@domain` VPA strings, email, display name), so
//! resolution walks a fixed priority chain and stops at the first match.
//! Later branches are unreachable once an earlier one matches; tests cover
//! each branch on its own.

use crate::directory::Directory;
use crate::model::UserProfile;

/// Shape of a raw receiver identifier, decided before any lookups run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Digits and `+` only; phone and numeric-id lookups apply.
    PhoneLike,
    /// Contains `@`; VPA-split and email lookups apply.
    Domain,
    /// Anything else; resolved by display name only.
    Freeform,
}

/// Classify a raw identifier string.
pub fn classify(raw: &str) -> IdentifierKind {
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit() || c == '+') {
        IdentifierKind::PhoneLike
    } else if raw.contains('@') {
        IdentifierKind::Domain
    } else {
        IdentifierKind::Freeform
    }
}

/// Resolve an identifier to a user, or `None` if every branch misses.
///
/// Priority order:
/// 1. exact wallet alias
/// 2. phone (exact, then `+91`-prefixed, then prefix-stripped)
/// 3. numeric user id
/// 4. `left@domain`: left part as alias, then as phone if all digits
/// 5. exact email
/// 6. display name (case-insensitive exact, then substring)
pub fn resolve(directory: &Directory, raw: &str) -> Option<UserProfile> {
    if let Some(user) = directory.find_by_alias(raw) {
        return Some(user);
    }

    match classify(raw) {
        IdentifierKind::PhoneLike => {
            if let Some(user) = resolve_phone(directory, raw) {
                return Some(user);
            }
            if let Ok(id) = raw.parse() {
                if let Some(user) = directory.find_by_id(id) {
                    return Some(user);
                }
            }
        }
        IdentifierKind::Domain => {
            // VPA-style string: the part before the first '@' may itself be
            // an alias or a bare phone number.
            if let Some((left, _)) = raw.split_once('@') {
                if let Some(user) = directory.find_by_alias(left) {
                    return Some(user);
                }
                if !left.is_empty() && left.chars().all(|c| c.is_ascii_digit()) {
                    if let Some(user) = directory.find_by_phone(left) {
                        return Some(user);
                    }
                }
            }
        }
        IdentifierKind::Freeform => {}
    }

    if let Some(user) = directory.find_by_email(raw) {
        return Some(user);
    }

    directory
        .find_by_name_exact(raw)
        .or_else(|| directory.find_by_name_contains(raw))
}

/// Phone matching with country-code fallbacks: exact first, then a bare
/// 10-digit number with `+91` prepended, then a 13-char `+91...` number
/// with the prefix stripped.
fn resolve_phone(directory: &Directory, raw: &str) -> Option<UserProfile> {
    if let Some(user) = directory.find_by_phone(raw) {
        return Some(user);
    }
    if raw.len() == 10 {
        return directory.find_by_phone(&format!("+91{raw}"));
    }
    if let Some(stripped) = raw.strip_prefix("+91") {
        if raw.len() == 13 {
            return directory.find_by_phone(stripped);
        }
    }
    None
}
