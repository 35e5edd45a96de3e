//! In-memory host for tests

use bytes::Bytes;
use minivm_core::{ExecutionResult, Host, Message, StorageStatus, TxContext};
use minivm_primitives::{Address, Word};
use std::collections::HashMap;

/// Storage of one mocked account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockedAccount {
    /// Storage slots; missing slots read as zero
    pub storage: HashMap<Word, Word>,
}

/// Host backed by plain maps
///
/// Nested calls are not executed. Each one is recorded in `recorded_calls`
/// and answered with a copy of `call_result`.
#[derive(Debug, Clone)]
pub struct MockedHost {
    /// Accounts by address
    pub accounts: HashMap<Address, MockedAccount>,
    /// Context returned by `get_tx_context`
    pub tx_context: TxContext,
    /// Result returned for every nested call
    pub call_result: ExecutionResult,
    /// Messages passed to `call`, in order
    pub recorded_calls: Vec<Message>,
}

impl MockedHost {
    /// Empty host whose nested calls succeed with no output
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            tx_context: TxContext::default(),
            call_result: ExecutionResult::success(0, Bytes::new()),
            recorded_calls: Vec::new(),
        }
    }

    /// Read a slot without going through the trait
    pub fn storage_at(&self, address: &Address, key: &Word) -> Word {
        self.get_storage(address, key)
    }

    /// Seed a storage slot
    pub fn set_storage_at(&mut self, address: Address, key: Word, value: Word) {
        self.accounts
            .entry(address)
            .or_default()
            .storage
            .insert(key, value);
    }
}

impl Default for MockedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockedHost {
    fn get_storage(&self, address: &Address, key: &Word) -> Word {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(key))
            .copied()
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: &Address, key: Word, value: Word) -> StorageStatus {
        let slot = self
            .accounts
            .entry(*address)
            .or_default()
            .storage
            .entry(key)
            .or_default();
        let status = StorageStatus::classify(slot, &value);
        *slot = value;
        status
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn call(&mut self, message: &Message) -> ExecutionResult {
        self.recorded_calls.push(message.clone());
        self.call_result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults_to_zero() {
        let host = MockedHost::new();
        assert_eq!(host.get_storage(&Address::ZERO, &Word::ONE), Word::ZERO);
    }

    #[test]
    fn test_set_storage_reports_status() {
        let mut host = MockedHost::new();
        let addr = Address::from_low_u64_be(1);
        let key = Word::ZERO;
        assert_eq!(host.set_storage(&addr, key, Word::ONE), StorageStatus::Added);
        assert_eq!(host.set_storage(&addr, key, Word::ONE), StorageStatus::Unchanged);
        assert_eq!(host.set_storage(&addr, key, Word::from_u64(2)), StorageStatus::Modified);
        assert_eq!(host.set_storage(&addr, key, Word::ZERO), StorageStatus::Deleted);
        assert_eq!(host.storage_at(&addr, &key), Word::ZERO);
    }

    #[test]
    fn test_call_is_recorded() {
        let mut host = MockedHost::new();
        host.call_result = ExecutionResult::revert(5, vec![0xaa]);
        let message = Message::call(Address::ZERO, Address::from_low_u64_be(3), 10);
        let result = host.call(&message);
        assert_eq!(result.output(), &[0xaa]);
        assert_eq!(host.recorded_calls, vec![message]);
    }
}
