//! Account entity and its store descriptors.

use serde::Serialize;

use crate::domain::foundation::{AccountId, Money, UserId};

/// A balance-holding account owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub balance: Money,
}

impl Account {
    /// True if the account belongs to the given user.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Fields for inserting an account.
///
/// `id: None` lets the store assign the identity. Webhook-created accounts
/// pass the provider's account id explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: Option<AccountId>,
    pub user_id: UserId,
    pub balance: Money,
}

impl NewAccount {
    /// An empty account with a caller-chosen identity.
    pub fn with_id(id: AccountId, user_id: UserId) -> Self {
        Self {
            id: Some(id),
            user_id,
            balance: Money::zero(),
        }
    }
}

/// Mutable account fields. The balance only moves through a credit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub user_id: Option<UserId>,
}

/// Conjunctive lookup criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub id: Option<AccountId>,
    pub user_id: Option<UserId>,
}

impl AccountFilter {
    pub fn by_id(id: AccountId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Narrows the filter to accounts owned by `user_id`.
    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.id.map_or(true, |id| account.id == id)
            && self.user_id.map_or(true, |user| account.user_id == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i64, user: i64) -> Account {
        Account {
            id: AccountId::new(id),
            user_id: UserId::new(user),
            balance: Money::zero(),
        }
    }

    #[test]
    fn filter_by_id_and_owner_requires_both() {
        let filter = AccountFilter::by_id(AccountId::new(5)).owned_by(UserId::new(1));

        assert!(filter.matches(&account(5, 1)));
        assert!(!filter.matches(&account(5, 2)));
        assert!(!filter.matches(&account(6, 1)));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(AccountFilter::default().matches(&account(1, 1)));
    }

    #[test]
    fn new_account_with_id_starts_at_zero() {
        let new = NewAccount::with_id(AccountId::new(5), UserId::new(1));
        assert_eq!(new.balance, Money::zero());
        assert_eq!(new.id, Some(AccountId::new(5)));
    }

    #[test]
    fn ownership_check() {
        assert!(account(5, 1).is_owned_by(UserId::new(1)));
        assert!(!account(5, 1).is_owned_by(UserId::new(2)));
    }
}
