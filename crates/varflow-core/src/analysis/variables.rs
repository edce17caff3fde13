use crate::values::ValueId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Version carried by hub records of computed and called results.
pub const SYNTHETIC_VERSION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Synonym {
    pub value: ValueId,
    pub version: i64,
}

impl Synonym {
    pub fn new(value: ValueId, version: i64) -> Self {
        Self { value, version }
    }
}

/// Every value known to alias one logical variable, oldest first.
///
/// Never empty: the first synonym is the defining value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    name: String,
    synonyms: Vec<Synonym>,
}

impl VariableRecord {
    fn new(name: String, defining: Synonym) -> Self {
        Self {
            name,
            synonyms: vec![defining],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    pub fn defining(&self) -> Synonym {
        self.synonyms[0]
    }

    pub fn current(&self) -> Synonym {
        self.synonyms[self.synonyms.len() - 1]
    }

    pub fn version(&self) -> i64 {
        self.current().version
    }

    pub fn is_synthetic(&self) -> bool {
        self.defining().version == SYNTHETIC_VERSION
    }

    pub fn contains(&self, value: ValueId) -> bool {
        self.synonyms.iter().any(|s| s.value == value)
    }

    pub fn values(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.synonyms.iter().map(|s| s.value)
    }
}

/// Ordered table of variable records.
///
/// Lookups by value return the first record, in table order, that lists the
/// value among its synonyms. `owners` caches that answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableTable {
    records: Vec<VariableRecord>,
    #[serde(skip)]
    owners: HashMap<ValueId, usize>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a variable defined by `value` at version 0.
    pub fn introduce(&mut self, name: impl Into<String>, value: ValueId) -> usize {
        self.push_record(VariableRecord::new(name.into(), Synonym::new(value, 0)))
    }

    /// Starts a hub record for a computed or called result.
    pub fn introduce_synthetic(&mut self, name: impl Into<String>, hub: ValueId) -> usize {
        self.push_record(VariableRecord::new(
            name.into(),
            Synonym::new(hub, SYNTHETIC_VERSION),
        ))
    }

    /// A read through `address` aliases `value` at the current version.
    /// Returns `None` when no record tracks `address`.
    pub fn record_read(&mut self, address: ValueId, value: ValueId) -> Option<usize> {
        let idx = self.owner_of(address)?;
        let version = self.records[idx].version();
        self.append(idx, Synonym::new(value, version));
        Some(idx)
    }

    /// A write through `address` makes `value` the next version. An unnamed
    /// variable takes its name from the first value written to it.
    pub fn record_write<F>(&mut self, address: ValueId, value: ValueId, name_of: F) -> Option<usize>
    where
        F: FnOnce(ValueId) -> String,
    {
        let idx = self.owner_of(address)?;
        let version = self.records[idx].version() + 1;
        self.append(idx, Synonym::new(value, version));

        let record = &mut self.records[idx];
        if record.name.is_empty() {
            record.name = name_of(value);
        }
        Some(idx)
    }

    pub fn owner_of(&self, value: ValueId) -> Option<usize> {
        self.owners.get(&value).copied()
    }

    pub fn record_of(&self, value: ValueId) -> Option<&VariableRecord> {
        self.owner_of(value).map(|idx| &self.records[idx])
    }

    /// Version at which `value` first joined its owning record.
    pub fn version_of(&self, value: ValueId) -> Option<i64> {
        self.record_of(value)?
            .synonyms
            .iter()
            .find(|s| s.value == value)
            .map(|s| s.version)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&VariableRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn records(&self) -> &[VariableRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&VariableRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn push_record(&mut self, record: VariableRecord) -> usize {
        let idx = self.records.len();
        let defining = record.defining().value;
        self.records.push(record);
        self.owners.entry(defining).or_insert(idx);
        idx
    }

    fn append(&mut self, idx: usize, synonym: Synonym) {
        self.records[idx].synonyms.push(synonym);
        self.owners
            .entry(synonym.value)
            .and_modify(|owner| *owner = (*owner).min(idx))
            .or_insert(idx);
    }

    /// Rebuilds the owner cache after deserialization.
    pub fn reindex(&mut self) {
        self.owners.clear();
        for (idx, record) in self.records.iter().enumerate() {
            for value in record.values() {
                self.owners.entry(value).or_insert(idx);
            }
        }
    }
}
