//! Core budget domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, database_id::BudgetId, transaction::Transaction, user::UserId};

/// A validated, non-empty budget name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BudgetName(String);

impl BudgetName {
    /// Create a budget name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyBudgetName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyBudgetName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a budget name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for BudgetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BudgetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetName::new(s)
    }
}

impl Display for BudgetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The icon for a budget, a single emoji such as "🍎".
///
/// An emoji may be made of several code points (skin tones, flags, ZWJ
/// sequences), so the check counts grapheme clusters rather than chars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Emoji(String);

impl Emoji {
    /// Create an emoji.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidEmoji] if `emoji` is not
    /// exactly one non-ASCII grapheme cluster.
    pub fn new(emoji: &str) -> Result<Self, Error> {
        let emoji = emoji.trim();
        let mut graphemes = emoji.graphemes(true);

        match (graphemes.next(), graphemes.next()) {
            (Some(grapheme), None) if !grapheme.is_ascii() => Ok(Self(grapheme.to_owned())),
            _ => Err(Error::InvalidEmoji(emoji.to_owned())),
        }
    }

    /// Create an emoji without validation.
    ///
    /// The caller should ensure that the string is a single emoji.
    pub fn new_unchecked(emoji: &str) -> Self {
        Self(emoji.to_string())
    }
}

impl AsRef<str> for Emoji {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks that `amount` can be used as a budget target or transaction amount.
///
/// # Errors
///
/// Returns [Error::NonPositiveAmount] if `amount` is not a finite number greater than zero.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::NonPositiveAmount(amount))
    }
}

/// A named spending limit owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserId,
    /// What the budget is for, e.g. "Groceries".
    pub name: BudgetName,
    /// The target amount in GNF that the budget's transactions should not exceed.
    pub amount: f64,
    /// The icon shown next to the budget and copied onto its transactions.
    pub emoji: Emoji,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

/// The data for creating a budget.
///
/// To use a creation time other than now, use [NewBudget::created_at].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// What the budget is for.
    pub name: BudgetName,
    /// The target amount in GNF.
    pub amount: f64,
    /// The icon for the budget.
    pub emoji: Emoji,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

impl NewBudget {
    /// Create the data for a new budget created now.
    pub fn new(name: BudgetName, amount: f64, emoji: Emoji) -> Self {
        Self {
            name,
            amount,
            emoji,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Set when the budget was created.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A budget together with all of its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetWithTransactions {
    /// The budget.
    pub budget: Budget,
    /// The budget's transactions, newest first.
    pub transactions: Vec<Transaction>,
}

impl BudgetWithTransactions {
    /// The sum of the budget's transaction amounts.
    pub fn total_spent(&self) -> f64 {
        self.transactions
            .iter()
            .map(|transaction| transaction.amount)
            .sum()
    }

    /// How much can still be spent before the target amount is reached.
    ///
    /// Negative if the budget has been overspent, which can only happen if
    /// transactions were recorded before the target amount was lowered.
    pub fn remaining(&self) -> f64 {
        self.budget.amount - self.total_spent()
    }

    /// Whether the total spent has reached the target amount.
    pub fn is_reached(&self) -> bool {
        self.total_spent() >= self.budget.amount
    }

    /// The percentage of the target amount that has been spent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.budget.amount <= 0.0 {
            return 100.0;
        }

        (self.total_spent() / self.budget.amount * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        Error,
        budget::{Budget, BudgetName, BudgetWithTransactions, Emoji, validate_amount},
        transaction::Transaction,
        user::UserId,
    };

    #[test]
    fn budget_name_is_trimmed() {
        assert_eq!(
            BudgetName::new("  Groceries "),
            Ok(BudgetName::new_unchecked("Groceries"))
        );
    }

    #[test]
    fn empty_budget_name_is_rejected() {
        assert_eq!(BudgetName::new("   "), Err(Error::EmptyBudgetName));
    }

    #[test]
    fn accepts_single_emoji() {
        assert_eq!(Emoji::new("🍎"), Ok(Emoji::new_unchecked("🍎")));
    }

    #[test]
    fn accepts_multi_code_point_emoji() {
        // Family emoji joined with zero width joiners.
        let family = "👨\u{200D}👩\u{200D}👧";

        assert_eq!(Emoji::new(family), Ok(Emoji::new_unchecked(family)));
    }

    #[test]
    fn rejects_invalid_emoji() {
        assert_eq!(Emoji::new(""), Err(Error::InvalidEmoji("".to_owned())));
        assert_eq!(Emoji::new("a"), Err(Error::InvalidEmoji("a".to_owned())));
        assert_eq!(
            Emoji::new("🍎🍕"),
            Err(Error::InvalidEmoji("🍎🍕".to_owned()))
        );
    }

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(validate_amount(1.0), Ok(1.0));
        assert_eq!(validate_amount(0.0), Err(Error::NonPositiveAmount(0.0)));
        assert_eq!(validate_amount(-5.0), Err(Error::NonPositiveAmount(-5.0)));
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    fn budget_with_spending(target: f64, amounts: &[f64]) -> BudgetWithTransactions {
        let created_at = datetime!(2025-01-10 09:00 UTC);

        BudgetWithTransactions {
            budget: Budget {
                id: 1,
                user_id: UserId::new(1),
                name: BudgetName::new_unchecked("Transport"),
                amount: target,
                emoji: Emoji::new_unchecked("🚗"),
                created_at,
            },
            transactions: amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| Transaction {
                    id: i as i64 + 1,
                    budget_id: 1,
                    amount: *amount,
                    description: "Taxi".to_owned(),
                    emoji: Emoji::new_unchecked("🚗"),
                    created_at,
                })
                .collect(),
        }
    }

    #[test]
    fn progress_of_partially_spent_budget() {
        let budget = budget_with_spending(300_000.0, &[60_000.0, 15_000.0]);

        assert_eq!(budget.total_spent(), 75_000.0);
        assert_eq!(budget.remaining(), 225_000.0);
        assert_eq!(budget.progress_percent(), 25.0);
        assert!(!budget.is_reached());
    }

    #[test]
    fn fully_spent_budget_is_reached() {
        let budget = budget_with_spending(500_000.0, &[500_000.0]);

        assert!(budget.is_reached());
        assert_eq!(budget.remaining(), 0.0);
        assert_eq!(budget.progress_percent(), 100.0);
    }

    #[test]
    fn empty_budget_has_no_progress() {
        let budget = budget_with_spending(200_000.0, &[]);

        assert_eq!(budget.total_spent(), 0.0);
        assert_eq!(budget.progress_percent(), 0.0);
    }
}
