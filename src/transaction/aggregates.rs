//! Running totals over a set of transactions.

use crate::transaction::{Transaction, TransactionType};

/// The totals shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregates {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub profit: f64,
}

impl Aggregates {
    /// Sum up `transactions`.
    ///
    /// Amounts that are not finite are counted as zero so a single bad record
    /// cannot poison the totals.
    pub fn compute<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (total_income, total_expense) =
            transactions
                .into_iter()
                .fold((0.0, 0.0), |(income, expense), transaction| {
                    let amount = if transaction.amount.is_finite() {
                        transaction.amount
                    } else {
                        0.0
                    };

                    match transaction.type_ {
                        TransactionType::Income => (income + amount, expense),
                        TransactionType::Expense => (income, expense + amount),
                    }
                });

        Self {
            total_income,
            total_expense,
            profit: total_income - total_expense,
        }
    }
}
