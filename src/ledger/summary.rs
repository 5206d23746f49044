use super::transaction::{Transaction, TransactionType};

/// Dashboard figures over a ledger snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    /// Amount per category, in order of first appearance
    pub by_category: Vec<(String, f64)>,
}

pub fn summarize(transactions: &[Transaction]) -> FinancialSummary {
    let total_for = |kind: TransactionType| -> f64 {
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    };
    let total_income = total_for(TransactionType::Income);
    let total_expense = total_for(TransactionType::Expense);

    let mut by_category: Vec<(String, f64)> = Vec::new();
    for tx in transactions {
        match by_category.iter_mut().find(|(name, _)| *name == tx.category) {
            Some((_, value)) => *value += tx.amount,
            None => by_category.push((tx.category.clone(), tx.amount)),
        }
    }

    FinancialSummary {
        total_income,
        total_expense,
        net_profit: total_income - total_expense,
        by_category,
    }
}
