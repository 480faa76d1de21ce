use std::collections::BTreeMap;

use safar_shared::models::farm::{
    CattleMilkSummary, FeedTransactionKind, MilkRecord, MilkSession, MilkSummaryReport,
};

/// Stock arithmetic for feed items. The repository persists the resulting
/// level together with the transaction row; callers must never write
/// `quantity_on_hand` directly.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: f64, available: f64 },
}

pub fn restock(on_hand: f64, quantity: f64) -> Result<f64, StockError> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(StockError::NonPositiveQuantity(quantity));
    }
    Ok(on_hand + quantity)
}

pub fn consume(on_hand: f64, quantity: f64) -> Result<f64, StockError> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(StockError::NonPositiveQuantity(quantity));
    }
    if quantity > on_hand {
        return Err(StockError::InsufficientStock {
            requested: quantity,
            available: on_hand,
        });
    }
    Ok(on_hand - quantity)
}

pub fn apply_transaction(
    on_hand: f64,
    kind: FeedTransactionKind,
    quantity: f64,
) -> Result<f64, StockError> {
    match kind {
        FeedTransactionKind::Purchase => restock(on_hand, quantity),
        FeedTransactionKind::Usage => consume(on_hand, quantity),
    }
}

/// Fold milk records into per-cattle totals, ordered by cattle id.
pub fn summarize_milk(records: &[MilkRecord]) -> MilkSummaryReport {
    let mut per_cattle: BTreeMap<String, CattleMilkSummary> = BTreeMap::new();
    let mut total = 0.0;

    for record in records {
        let entry = per_cattle
            .entry(record.cattle_id.clone())
            .or_insert_with(|| CattleMilkSummary {
                cattle_id: record.cattle_id.clone(),
                total_litres: 0.0,
                mornings: 0,
                evenings: 0,
            });
        entry.total_litres += record.quantity_litres;
        match record.session {
            MilkSession::Morning => entry.mornings += 1,
            MilkSession::Evening => entry.evenings += 1,
        }
        total += record.quantity_litres;
    }

    MilkSummaryReport {
        per_cattle: per_cattle.into_values().collect(),
        total_litres: total,
        record_count: records.len(),
    }
}
