//! The in-flight cost table of one Monte-Carlo sample.
//!
//! RULE: Each sample owns its table. The account tree is shared read-only.

use crate::{
    account_tree::AccountTree,
    error::{CostError, CostResult},
    escalation::EscalatedRow,
    types::{AccountId, CostColumn},
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CostRow {
    pub account: AccountId,
    pub title:   String,
    /// `None` for synthesized summary rows.
    pub level:   Option<u8>,
    pub foak:    Option<f64>,
    pub noak:    Option<f64>,
}

impl CostRow {
    pub fn cost(&self, column: CostColumn) -> Option<f64> {
        match column {
            CostColumn::Foak => self.foak,
            CostColumn::Noak => self.noak,
        }
    }

    fn cost_mut(&mut self, column: CostColumn) -> &mut Option<f64> {
        match column {
            CostColumn::Foak => &mut self.foak,
            CostColumn::Noak => &mut self.noak,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CostTable {
    rows:  Vec<CostRow>,
    index: HashMap<AccountId, Vec<usize>>,
    tree:  Arc<AccountTree>,
}

impl CostTable {
    /// Empty-cost table over the escalated catalog rows.
    pub fn from_escalated(rows: &[EscalatedRow], tree: Arc<AccountTree>) -> Self {
        let mut table = Self {
            rows: Vec::with_capacity(rows.len() + 24),
            index: HashMap::new(),
            tree,
        };
        for r in rows {
            table.push(CostRow {
                account: r.row.account.clone(),
                title:   r.row.title.clone(),
                level:   Some(r.row.level),
                foak:    None,
                noak:    None,
            });
        }
        table
    }

    fn push(&mut self, row: CostRow) {
        self.index.entry(row.account.clone()).or_default().push(self.rows.len());
        self.rows.push(row);
    }

    /// Append a summary row (`OCC`, `TCI`, ...) with empty costs.
    pub fn push_summary(&mut self, account: &str, title: &str) {
        self.push(CostRow {
            account: AccountId::parse(account),
            title:   title.to_string(),
            level:   None,
            foak:    None,
            noak:    None,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> &CostRow {
        &self.rows[idx]
    }

    pub fn tree(&self) -> &AccountTree {
        &self.tree
    }

    pub fn set_row_cost(&mut self, idx: usize, column: CostColumn, value: Option<f64>) {
        *self.rows[idx].cost_mut(column) = value;
    }

    pub fn positions(&self, account: &str) -> &[usize] {
        self.index
            .get(&AccountId::parse(account))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cost cell of the first row with `account`, if the row exists.
    pub fn cost_opt(&self, account: &str, column: CostColumn) -> Option<Option<f64>> {
        self.positions(account).first().map(|&i| self.rows[i].cost(column))
    }

    /// Cost of a required account. An empty cell reads as NaN so that a
    /// broken catalog surfaces as a visibly invalid estimate.
    pub fn cost(&self, account: &str, column: CostColumn) -> CostResult<f64> {
        self.cost_opt(account, column)
            .map(|c| c.unwrap_or(f64::NAN))
            .ok_or_else(|| CostError::MissingAccount {
                account: account.to_string(),
            })
    }

    /// Sum over every row of the listed accounts, skipping absent rows and
    /// empty cells.
    pub fn sum(&self, accounts: &[&str], column: CostColumn) -> f64 {
        accounts
            .iter()
            .flat_map(|a| self.positions(a))
            .filter_map(|&i| self.rows[i].cost(column))
            .sum()
    }

    /// Set the cost of every row with `account`. No-op if none exists.
    pub fn set_cost(&mut self, account: &str, column: CostColumn, value: f64) {
        let positions: Vec<usize> = self.positions(account).to_vec();
        for i in positions {
            *self.rows[i].cost_mut(column) = Some(value);
        }
    }

    /// Multiply every populated cell in `column` whose account satisfies `pred`.
    pub fn scale_where<F>(&mut self, column: CostColumn, factor: f64, pred: F)
    where
        F: Fn(&AccountId) -> bool,
    {
        for row in self.rows.iter_mut().filter(|r| pred(&r.account)) {
            if let Some(v) = row.cost_mut(column) {
                *v *= factor;
            }
        }
    }
}
