use crate::{
    ENZYMES,
    catalog::ReagentCatalog,
    error::EngineError,
    ids::ItemId,
    inventory::{Inventory, InventoryStore},
    mixture::combine,
    order::order,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub type OpId = String;
pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    OrderReagent {
        name: String,
        quantity: String,
    },
    CombineItems {
        #[serde(alias = "ID1")]
        id1: ItemId,
        #[serde(alias = "ID2")]
        id2: ItemId,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderReagent { .. } => "OrderReagent",
            Self::CombineItems { .. } => "CombineItems",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub created_ids: Vec<ItemId>,
    pub consumed_ids: Vec<ItemId>,
    pub struck_ids: Vec<ItemId>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub recognized_enzymes: Vec<String>,
    pub deterministic_operation_log: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSummary {
    pub item_count: usize,
    pub next_id: ItemId,
    pub items: Vec<ItemSummary>,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &Inventory;
}

#[derive(Debug, Clone, Default)]
pub struct LabEngine {
    state: Inventory,
    catalog: ReagentCatalog,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl LabEngine {
    pub fn new(catalog: ReagentCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn from_state(state: Inventory, catalog: ReagentCatalog) -> Self {
        Self {
            state,
            catalog,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &Inventory {
        &self.state
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            supported_operations: vec!["OrderReagent".to_string(), "CombineItems".to_string()],
            recognized_enzymes: ENZYMES
                .recognition_sequences()
                .iter()
                .map(|rs| rs.name.clone())
                .collect(),
            deterministic_operation_log: true,
        }
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    pub fn summarize_state(&self) -> StateSummary {
        StateSummary {
            item_count: self.state.len(),
            next_id: self.state.next_id.peek(),
            items: self
                .state
                .items
                .iter()
                .map(|item| ItemSummary {
                    id: item.id(),
                    kind: item.type_tag().to_string(),
                    label: item.to_string(),
                })
                .collect(),
        }
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn apply_internal(&mut self, op: Operation, run_id: &str) -> Result<OpResult, EngineError> {
        let mut result = OpResult {
            op_id: self.next_op_id(),
            ..OpResult::default()
        };
        debug!("Applying {} as {} (run '{run_id}')", op.name(), result.op_id);

        match op {
            Operation::OrderReagent { name, quantity } => {
                let outcome = order(&self.state, &self.catalog, &name, &quantity)?;
                self.state = outcome.inventory;
                result.created_ids.push(outcome.item_id);
                result
                    .messages
                    .push(format!("Ordered {quantity} of '{name}' as item {}", outcome.item_id));
            }
            Operation::CombineItems { id1, id2 } => {
                let outcome = combine(&self.state, id1, id2, &ENZYMES).inspect_err(|e| {
                    warn!("Rejected combine of {id1} and {id2}: {e}");
                })?;
                self.state = outcome.inventory;
                result.created_ids = outcome.created_ids;
                result.consumed_ids = outcome.consumed_ids.to_vec();
                result.struck_ids = outcome.struck_ids.into_iter().collect();
                for digestion in &outcome.digestions {
                    result.messages.push(format!(
                        "{} cut DNA {} into {} fragment(s)",
                        digestion.enzyme_name,
                        digestion.strand_id,
                        digestion.fragment_ids.len()
                    ));
                }
                result.messages.push(format!(
                    "Combined items {id1} and {id2} into mixture {}",
                    outcome.mixture_id
                ));
            }
        }
        Ok(result)
    }
}

impl Engine for LabEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(op.clone(), &run_id)?;
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone(), &wf.run_id)?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &Inventory {
        &self.state
    }
}

/// Read the stored inventory, apply `op`, and write the result back.
///
/// The store is written only when the operation succeeded.
pub fn run_operation<S: InventoryStore>(
    store: &S,
    catalog: &ReagentCatalog,
    op: Operation,
) -> Result<OpResult, EngineError> {
    let mut engine = LabEngine::from_state(store.read()?, catalog.clone());
    let result = engine.apply(op)?;
    store.write(engine.state())?;
    Ok(result)
}

/// Like [`run_operation`] for a whole workflow; nothing is written if any op fails.
pub fn run_workflow<S: InventoryStore>(
    store: &S,
    catalog: &ReagentCatalog,
    wf: Workflow,
) -> Result<Vec<OpResult>, EngineError> {
    let mut engine = LabEngine::from_state(store.read()?, catalog.clone());
    let results = engine.apply_workflow(wf)?;
    store.write(engine.state())?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, ids::IdCounter, inventory::MemoryStore, item::Item};

    fn catalog() -> ReagentCatalog {
        ReagentCatalog::from_json_str(
            r#"[{"type": "RestrictionEnzyme", "name": "EcoR1"},
                {"type": "RestrictionEnzyme", "name": "BamHI"},
                {"type": "DNA", "name": "insert", "sequence": "AGAATTCTAGAATTCG"},
                {"type": "Reagent", "name": "Buffer"}]"#,
        )
        .unwrap()
    }

    fn order_op(name: &str) -> Operation {
        Operation::OrderReagent {
            name: name.to_string(),
            quantity: "1 unit".to_string(),
        }
    }

    #[test]
    fn test_order_then_combine_digests() {
        let mut engine = LabEngine::new(catalog());
        engine.apply(order_op("EcoR1")).unwrap();
        engine.apply(order_op("insert")).unwrap();
        let res = engine
            .apply(Operation::CombineItems { id1: 1, id2: 2 })
            .unwrap();
        assert_eq!(res.op_id, "op-3");
        assert_eq!(res.created_ids, vec![3, 4, 5, 6]);
        assert_eq!(res.consumed_ids, vec![1, 2]);
        assert_eq!(res.struck_ids, vec![2]);
        assert!(res.messages.iter().any(|m| m.contains("EcoR1 cut DNA 2")));
        assert_eq!(engine.state().len(), 1);
        assert_eq!(engine.state().next_id.peek(), 7);
        assert_eq!(engine.operation_log().len(), 3);
    }

    #[test]
    fn test_failed_op_is_not_journaled() {
        let mut engine = LabEngine::new(catalog());
        engine.apply(order_op("Buffer")).unwrap();
        let err = engine
            .apply(Operation::CombineItems { id1: 999, id2: 1 })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidId);
        assert_eq!(engine.operation_log().len(), 1);
        assert_eq!(engine.state().len(), 1);
        assert_eq!(engine.state().next_id, IdCounter::new(2));
    }

    #[test]
    fn test_operation_json_shape() {
        let op: Operation =
            serde_json::from_str(r#"{"CombineItems": {"ID1": 3, "ID2": 4}}"#).unwrap();
        assert_eq!(op, Operation::CombineItems { id1: 3, id2: 4 });
        let op: Operation =
            serde_json::from_str(r#"{"OrderReagent": {"name": "EcoR1", "quantity": "5 units"}}"#)
                .unwrap();
        assert_eq!(op.name(), "OrderReagent");
    }

    #[test]
    fn test_workflow_runs_in_order() {
        let mut engine = LabEngine::new(catalog());
        let results = engine
            .apply_workflow(Workflow {
                run_id: "digest".to_string(),
                ops: vec![
                    order_op("BamHI"),
                    order_op("insert"),
                    Operation::CombineItems { id1: 2, id2: 1 },
                ],
            })
            .unwrap();
        assert_eq!(results.len(), 3);
        // unknown recognition sequence: nothing is cut
        assert!(results[2].struck_ids.is_empty());
        assert_eq!(results[2].created_ids, vec![3]);
        assert!(
            engine
                .operation_log()
                .iter()
                .all(|record| record.run_id == "digest")
        );
    }

    #[test]
    fn test_run_operation_writes_only_on_success() {
        let store = MemoryStore::new(Inventory::default());
        run_operation(&store, &catalog(), order_op("Buffer")).unwrap();
        run_operation(&store, &catalog(), order_op("insert")).unwrap();
        assert_eq!(store.write_count(), 2);

        let before = store.read().unwrap();
        let err = run_operation(
            &store,
            &catalog(),
            Operation::CombineItems { id1: 999, id2: 1 },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidId);
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.read().unwrap(), before);
    }

    #[test]
    fn test_run_workflow_is_all_or_nothing_for_the_store() {
        let store = MemoryStore::new(Inventory::default());
        let err = run_workflow(
            &store,
            &catalog(),
            Workflow {
                run_id: "wf".to_string(),
                ops: vec![order_op("Buffer"), order_op("Unobtainium")],
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(store.write_count(), 0);
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn test_summarize_state() {
        let mut engine = LabEngine::new(catalog());
        engine.apply(order_op("Buffer")).unwrap();
        let summary = engine.summarize_state();
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.next_id, 2);
        assert_eq!(summary.items[0].kind, "Reagent");
        assert!(matches!(engine.snapshot().items[0], Item::Reagent(_)));
    }

    #[test]
    fn test_capabilities_list_ecor1() {
        let caps = LabEngine::capabilities();
        assert!(caps.recognized_enzymes.contains(&"EcoR1".to_string()));
        assert_eq!(caps.supported_operations.len(), 2);
    }
}
