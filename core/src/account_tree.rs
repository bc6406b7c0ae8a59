//! Account tree and high-level cost rollup.
//!
//! The catalog is a pre-order serialization of the account tree: the
//! children of a row are the following rows at `Level + 1`, up to the first
//! row whose level is less than or equal to its own. The tree is built once
//! into an arena of parent/child indices; rollup then walks the arena.

use crate::{
    escalation::EscalatedRow,
    params::DesignParams,
    table::CostTable,
    types::{AccountGroup, AccountId, CostColumn, SampleIndex},
};
use std::collections::BTreeSet;

/// Deepest level the catalog may use.
pub const MAX_LEVEL: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub level:    u8,
    pub parent:   Option<usize>,
    pub children: Vec<usize>,
}

/// Arena of catalog rows indexed by row position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountTree {
    nodes: Vec<TreeNode>,
}

impl AccountTree {
    /// Build the tree from row levels in catalog order.
    ///
    /// A row only becomes a child if the nearest open ancestor sits exactly
    /// one level above it; rows that skip a level have no parent.
    pub fn from_levels<I: IntoIterator<Item = u8>>(levels: I) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for level in levels {
            let idx = nodes.len();
            while open.last().is_some_and(|&top| nodes[top].level >= level) {
                open.pop();
            }
            let parent = open
                .last()
                .copied()
                .filter(|&top| nodes[top].level + 1 == level);
            if let Some(p) = parent {
                nodes[p].children.push(idx);
            }
            nodes.push(TreeNode { level, parent, children: Vec::new() });
            open.push(idx);
        }
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of row `idx`; rows outside the tree (summary rows) have none.
    pub fn children(&self, idx: usize) -> &[usize] {
        self.nodes.get(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.nodes.get(idx).and_then(|n| n.parent)
    }
}

/// Drop rows whose optional-variable conditions are not met by `params`.
///
/// The primary and secondary conditions are checked independently; a row
/// is kept only if every condition it declares matches.
pub fn remove_irrelevant_accounts(
    rows: Vec<EscalatedRow>,
    params: &DesignParams,
) -> Vec<EscalatedRow> {
    rows.into_iter()
        .filter(|r| {
            [&r.row.optional, &r.row.sec_optional]
                .into_iter()
                .flatten()
                .all(|cond| {
                    let keep = cond.is_satisfied(params);
                    if keep {
                        log::info!(
                            "For the cost of the Account {}: {}, the {} is selected to be {}",
                            r.row.account,
                            r.row.title,
                            cond.variable,
                            cond.value
                        );
                    }
                    keep
                })
        })
        .collect()
}

/// Comma-joined child account ids for every row whose FOAK cost is empty
/// (`None` for rows with a cost or without children).
pub fn find_children_accounts(table: &CostTable) -> Vec<Option<String>> {
    (0..table.len())
        .map(|idx| {
            if table.row(idx).foak.is_some() {
                return None;
            }
            let children = table.tree().children(idx);
            if children.is_empty() {
                return None;
            }
            let ids: Vec<&str> = children
                .iter()
                .map(|&c| table.row(c).account.as_str())
                .collect();
            Some(ids.join(","))
        })
        .collect()
}

/// Fill empty `column` cells of in-group rows at `level` with the sum of
/// their children. `eligible` marks rows whose children take part.
fn calculate_high_level_accounts_cost(
    table: &mut CostTable,
    eligible: &[bool],
    level: u8,
    group: AccountGroup,
    column: CostColumn,
) {
    for idx in 0..table.len() {
        let row = table.row(idx);
        if row.level != Some(level) || !group.contains(&row.account) || row.cost(column).is_some() {
            continue;
        }
        if !eligible[idx] {
            continue;
        }
        let total: Option<f64> = table
            .tree()
            .children(idx)
            .iter()
            .map(|&c| table.row(c).cost(column))
            .sum();
        table.set_row_cost(idx, column, total);
    }
}

/// Roll FOAK and NOAK costs of one account group up the tree, level 4 → 0.
///
/// In-group rows with no cost and no children are set to 0. Their accounts
/// are returned, and logged once when `sample` is the first sample.
pub fn update_high_level_costs(
    table: &mut CostTable,
    group: AccountGroup,
    sample: SampleIndex,
) -> Vec<AccountId> {
    let eligible: Vec<bool> = find_children_accounts(table)
        .iter()
        .map(Option::is_some)
        .collect();
    let mut no_subaccounts: BTreeSet<AccountId> = BTreeSet::new();

    for level in (0..=MAX_LEVEL).rev() {
        for column in CostColumn::BOTH {
            calculate_high_level_accounts_cost(table, &eligible, level, group, column);
        }
        for idx in 0..table.len() {
            let row = table.row(idx);
            if row.level != Some(level) || !group.contains(&row.account) || eligible[idx] {
                continue;
            }
            for column in CostColumn::BOTH {
                if table.row(idx).cost(column).is_none() {
                    table.set_row_cost(idx, column, Some(0.0));
                    no_subaccounts.insert(table.row(idx).account.clone());
                }
            }
        }
    }

    if sample == 0 && !no_subaccounts.is_empty() {
        let list: Vec<&str> = no_subaccounts.iter().map(AccountId::as_str).collect();
        log::warn!(
            "The following {} accounts do not have any subaccounts: {}",
            group.name(),
            list.join(", ")
        );
    }
    no_subaccounts.into_iter().collect()
}
