//! Ownership rules for stored resumes.
//!
//! Every record carries an [`Owner`]. Unauthenticated uploads are owned by the
//! anonymous sentinel and may later be adopted ("claimed") by the first
//! authenticated caller that opens them with claiming enabled. A claim is
//! one-way: a real owner is never replaced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved owner string for unauthenticated callers.
pub const ANONYMOUS: &str = "anonymous";

/// Identity that owns a record or issues a request.
/// Persisted as a plain string; `"anonymous"` maps to [`Owner::Anonymous`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Owner {
    Anonymous,
    User(String),
}

impl Owner {
    /// Builds an owner from an identity-provider uid. Blank uids are anonymous.
    pub fn from_uid(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        if uid.trim().is_empty() {
            Owner::Anonymous
        } else {
            Owner::from(uid)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Owner::Anonymous => ANONYMOUS,
            Owner::User(uid) => uid,
        }
    }
}

impl From<String> for Owner {
    fn from(value: String) -> Self {
        if value == ANONYMOUS {
            Owner::Anonymous
        } else {
            Owner::User(value)
        }
    }
}

impl From<&str> for Owner {
    fn from(value: &str) -> Self {
        Owner::from(value.to_string())
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        match owner {
            Owner::Anonymous => ANONYMOUS.to_string(),
            Owner::User(uid) => uid,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the pure ownership check, before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Grant,
    Claim,
    Deny,
}

/// Decides whether `caller` may access a record owned by `owner`.
///
/// Guards are evaluated in a fixed order:
/// 1. exact owner match
/// 2. anonymous owner, anonymous caller
/// 3. anonymous owner, authenticated caller, claiming allowed
/// 4. everything else is denied
pub fn decide(owner: &Owner, caller: &Owner, allow_claim: bool) -> Decision {
    match (owner, caller) {
        (Owner::User(owner_uid), Owner::User(caller_uid)) if owner_uid == caller_uid => {
            Decision::Grant
        }
        // Weak identity: any anonymous caller reads any anonymous record.
        (Owner::Anonymous, Owner::Anonymous) => Decision::Grant,
        (Owner::Anonymous, Owner::User(_)) if allow_claim => Decision::Claim,
        _ => Decision::Deny,
    }
}

/// Result of resolving a record id for a caller.
/// `Denied` and `NotFound` stay distinct so handlers can answer 403 vs 404.
#[derive(Debug, Clone, PartialEq)]
pub enum Access<R> {
    Granted(R),
    /// Record was anonymous and now belongs to the caller.
    Claimed(R),
    Denied,
    NotFound,
}

impl<R> Access<R> {
    /// Collapses the outcome to the record, hiding why access failed.
    pub fn into_record(self) -> Option<R> {
        match self {
            Access::Granted(record) | Access::Claimed(record) => Some(record),
            Access::Denied | Access::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str) -> Owner {
        Owner::User(uid.to_string())
    }

    #[test]
    fn test_exact_owner_is_granted() {
        assert_eq!(decide(&user("u1"), &user("u1"), false), Decision::Grant);
        assert_eq!(decide(&user("u1"), &user("u1"), true), Decision::Grant);
    }

    #[test]
    fn test_anonymous_reads_anonymous() {
        assert_eq!(
            decide(&Owner::Anonymous, &Owner::Anonymous, false),
            Decision::Grant
        );
        assert_eq!(
            decide(&Owner::Anonymous, &Owner::Anonymous, true),
            Decision::Grant
        );
    }

    #[test]
    fn test_authenticated_caller_claims_anonymous_when_allowed() {
        assert_eq!(decide(&Owner::Anonymous, &user("u1"), true), Decision::Claim);
    }

    #[test]
    fn test_no_claim_without_permission() {
        assert_eq!(decide(&Owner::Anonymous, &user("u1"), false), Decision::Deny);
    }

    #[test]
    fn test_real_owner_is_never_reclaimed() {
        assert_eq!(decide(&user("u1"), &user("u2"), true), Decision::Deny);
        assert_eq!(decide(&user("u1"), &Owner::Anonymous, true), Decision::Deny);
    }

    #[test]
    fn test_owner_string_round_trip() {
        assert_eq!(Owner::from("anonymous"), Owner::Anonymous);
        assert_eq!(Owner::from("user-42"), user("user-42"));
        assert_eq!(String::from(Owner::Anonymous), "anonymous");
        assert_eq!(
            serde_json::to_value(user("user-42")).unwrap(),
            serde_json::json!("user-42")
        );
        let parsed: Owner = serde_json::from_value(serde_json::json!("anonymous")).unwrap();
        assert_eq!(parsed, Owner::Anonymous);
    }

    #[test]
    fn test_blank_uid_is_anonymous() {
        assert_eq!(Owner::from_uid("  "), Owner::Anonymous);
        assert_eq!(Owner::from_uid("abc"), user("abc"));
    }

    #[test]
    fn test_into_record_hides_denial_reason() {
        assert_eq!(Access::Granted(1).into_record(), Some(1));
        assert_eq!(Access::Claimed(2).into_record(), Some(2));
        assert_eq!(Access::<i32>::Denied.into_record(), None);
        assert_eq!(Access::<i32>::NotFound.into_record(), None);
    }
}
