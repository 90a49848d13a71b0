//! # Sale Ledger
//!
//! An explicit, caller-owned ordered container of sale records with
//! undo/redo — the replacement for the legacy sheet's page-global arrays and
//! DOM-bound caches.
//!
//! ## Ledger Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ledger Operations                                  │
//! │                                                                         │
//! │  Edit Surface Action       Ledger Call              State Change        │
//! │  ───────────────────       ───────────              ────────────        │
//! │                                                                         │
//! │  Add Row ────────────────► insert(record) ────────► records.push        │
//! │                                                                         │
//! │  Edit Amount ────────────► update_inputs() ───────► inputs + recompute  │
//! │                                                                         │
//! │  Change 개통방식 ─────────► set_activation_type() ─► discount default   │
//! │                                                      on transition      │
//! │  Delete Row ─────────────► remove(id) ────────────► records.retain      │
//! │                                                                         │
//! │  Ctrl+Z / Ctrl+Y ────────► undo() / redo() ───────► snapshot stack      │
//! │                                                                         │
//! │  Every mutating call snapshots first, recomputes the touched row, and  │
//! │  clears the redo stack. Undo state is plain data on this struct —      │
//! │  never an ambient global.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::calculator::{default_mnp_discount, SettlementCalculator};
use crate::types::{ActivationType, SaleInputs, SaleRecord, SettlementSummary};

/// Maximum retained undo snapshots.
///
/// A settlement sheet session is hundreds of edits; 50 steps matches what
/// the legacy sheet offered without letting snapshots grow unbounded.
pub const MAX_UNDO_DEPTH: usize = 50;

/// An ordered collection of sale records with snapshot-based undo/redo.
///
/// ## Invariants
/// - Records are unique by `id` and keep insertion order
/// - Every record's derived fields are consistent with its inputs under the
///   ledger's calculator at all times
/// - Undo and redo restore exact prior contents; a new edit clears redo
#[derive(Debug, Clone)]
pub struct SaleLedger {
    calculator: SettlementCalculator,
    records: Vec<SaleRecord>,
    undo_stack: Vec<Vec<SaleRecord>>,
    redo_stack: Vec<Vec<SaleRecord>>,
}

impl SaleLedger {
    /// Creates an empty ledger using the authoritative calculator.
    pub fn new() -> Self {
        SaleLedger::with_calculator(SettlementCalculator::default())
    }

    /// Creates an empty ledger with an explicit calculator.
    pub fn with_calculator(calculator: SettlementCalculator) -> Self {
        SaleLedger {
            calculator,
            records: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Returns the ledger's calculator.
    pub fn calculator(&self) -> &SettlementCalculator {
        &self.calculator
    }

    /// Inserts a record and returns its id.
    ///
    /// Derived fields are recomputed on the way in, so a record built by an
    /// import adapter or a caller with stale figures is corrected here.
    pub fn insert(&mut self, mut record: SaleRecord) -> String {
        self.snapshot();
        self.calculator.recalculate(&mut record);
        let id = record.id.clone();
        // Re-inserting an existing id replaces the row in place.
        if let Some(existing) = self.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            self.records.push(record);
        }
        id
    }

    /// Replaces a record's input amounts and recomputes its derived fields.
    ///
    /// Returns `false` if the id is unknown (in which case nothing changes
    /// and no undo step is recorded).
    pub fn update_inputs(&mut self, id: &str, inputs: SaleInputs) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.snapshot();
        let record = &mut self.records[index];
        record.inputs = inputs;
        record.updated_at = chrono::Utc::now();
        self.calculator.recalculate(record);
        true
    }

    /// Changes a record's activation type.
    ///
    /// ## Transition Rule
    /// On a *transition* (new type differs from the current one) the
    /// document discount is auto-set: −800 for 신규/번이, 0 for 기변.
    /// Re-setting the same type is a no-op for the discount, so a manually
    /// entered value is never silently overwritten after the fact.
    pub fn set_activation_type(&mut self, id: &str, activation_type: ActivationType) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.snapshot();
        let record = &mut self.records[index];
        if record.activation_type != activation_type {
            record.activation_type = activation_type;
            record.inputs.new_mnp_discount = default_mnp_discount(activation_type);
        }
        record.updated_at = chrono::Utc::now();
        self.calculator.recalculate(record);
        true
    }

    /// Removes a record. Hard delete; there are no soft-delete semantics.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.snapshot();
        self.records.retain(|r| r.id != id);
        true
    }

    /// Reverts the most recent mutation. Returns `false` with no change if
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(std::mem::replace(&mut self.records, previous));
        true
    }

    /// Re-applies the most recently undone mutation.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(std::mem::replace(&mut self.records, next));
        true
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Option<&SaleRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rollup over the current records, for the sheet's summary row.
    pub fn summary(&self) -> SettlementSummary {
        crate::calculator::aggregate(&self.records)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Pushes the current contents onto the undo stack and invalidates redo.
    fn snapshot(&mut self) {
        if self.undo_stack.len() == MAX_UNDO_DEPTH {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(self.records.clone());
        self.redo_stack.clear();
    }
}

impl Default for SaleLedger {
    fn default() -> Self {
        SaleLedger::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleInputs;

    fn record_with_base(base_price: i64) -> SaleRecord {
        let mut record = SaleRecord::new();
        record.inputs.base_price = base_price;
        record
    }

    #[test]
    fn test_insert_recomputes_derived() {
        let mut ledger = SaleLedger::new();
        let mut record = record_with_base(150_000);
        record.derived.settlement_amount = 999; // stale client figure

        let id = ledger.insert(record);
        let stored = ledger.get(&id).unwrap();
        assert_eq!(stored.derived.rebate_total, 150_000);
        assert_eq!(stored.derived.settlement_amount, 150_000);
    }

    #[test]
    fn test_update_inputs_triggers_recompute() {
        let mut ledger = SaleLedger::new();
        let id = ledger.insert(record_with_base(100_000));

        let updated = ledger.update_inputs(
            &id,
            SaleInputs {
                base_price: 100_000,
                usim_fee: 5_500,
                ..SaleInputs::default()
            },
        );
        assert!(updated);
        assert_eq!(ledger.get(&id).unwrap().derived.settlement_amount, 105_500);

        assert!(!ledger.update_inputs("no-such-id", SaleInputs::default()));
    }

    #[test]
    fn test_activation_transition_sets_discount() {
        let mut ledger = SaleLedger::new();
        let mut record = record_with_base(100_000);
        record.activation_type = ActivationType::DeviceChange;
        let id = ledger.insert(record);

        // 기변 → 신규 applies the -800 default regardless of prior value.
        ledger.set_activation_type(&id, ActivationType::New);
        assert_eq!(ledger.get(&id).unwrap().inputs.new_mnp_discount, -800);

        // 신규 → 기변 zeroes it.
        ledger.set_activation_type(&id, ActivationType::DeviceChange);
        assert_eq!(ledger.get(&id).unwrap().inputs.new_mnp_discount, 0);
    }

    #[test]
    fn test_same_activation_type_keeps_user_value() {
        let mut ledger = SaleLedger::new();
        let mut record = record_with_base(100_000);
        record.activation_type = ActivationType::Mnp;
        record.inputs.new_mnp_discount = -1_500; // user-entered override
        let id = ledger.insert(record);

        ledger.set_activation_type(&id, ActivationType::Mnp);
        assert_eq!(ledger.get(&id).unwrap().inputs.new_mnp_discount, -1_500);
    }

    #[test]
    fn test_remove() {
        let mut ledger = SaleLedger::new();
        let id = ledger.insert(record_with_base(100_000));
        assert_eq!(ledger.len(), 1);

        assert!(ledger.remove(&id));
        assert!(ledger.is_empty());
        assert!(!ledger.remove(&id));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut ledger = SaleLedger::new();
        let id = ledger.insert(record_with_base(100_000));
        ledger.update_inputs(
            &id,
            SaleInputs {
                base_price: 200_000,
                ..SaleInputs::default()
            },
        );
        assert_eq!(ledger.get(&id).unwrap().inputs.base_price, 200_000);

        assert!(ledger.undo());
        assert_eq!(ledger.get(&id).unwrap().inputs.base_price, 100_000);

        assert!(ledger.redo());
        assert_eq!(ledger.get(&id).unwrap().inputs.base_price, 200_000);

        // Undo all the way back to empty.
        assert!(ledger.undo());
        assert!(ledger.undo());
        assert!(ledger.is_empty());
        assert!(!ledger.undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut ledger = SaleLedger::new();
        let id = ledger.insert(record_with_base(100_000));
        ledger.undo();
        assert!(ledger.can_redo());

        ledger.insert(record_with_base(50_000));
        assert!(!ledger.can_redo());
        assert!(ledger.get(&id).is_none());
    }

    #[test]
    fn test_failed_op_records_no_undo_step() {
        let mut ledger = SaleLedger::new();
        assert!(!ledger.update_inputs("ghost", SaleInputs::default()));
        assert!(!ledger.set_activation_type("ghost", ActivationType::New));
        assert!(!ledger.can_undo());
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let mut ledger = SaleLedger::new();
        for i in 0..(MAX_UNDO_DEPTH + 10) {
            ledger.insert(record_with_base(i as i64));
        }
        let mut undone = 0;
        while ledger.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_DEPTH);
    }

    #[test]
    fn test_summary_over_current_rows() {
        let mut ledger = SaleLedger::new();
        ledger.insert(record_with_base(100_000));
        ledger.insert(record_with_base(50_000));

        let summary = ledger.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_rebate, 150_000);
        assert_eq!(summary.total_settlement, 150_000);
    }
}
