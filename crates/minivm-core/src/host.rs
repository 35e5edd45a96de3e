//! Host capability consumed by the interpreter
//!
//! The interpreter never stores or inspects host state. Everything outside
//! the stack, memory and gas meter of the current execution is reached
//! through this trait, including nested calls, which the host executes
//! synchronously (typically by running another interpreter).

use crate::context::{Message, TxContext};
use crate::result::ExecutionResult;
use minivm_primitives::{Address, Word};

/// Effect of a storage write, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageStatus {
    /// New value equals the old one
    Unchanged,
    /// A non-zero value was replaced by another non-zero value
    Modified,
    /// A zero slot became non-zero
    Added,
    /// A non-zero slot became zero
    Deleted,
}

impl StorageStatus {
    /// Classify a write of `new` over `current`
    pub fn classify(current: &Word, new: &Word) -> Self {
        match (current.is_zero(), new.is_zero()) {
            _ if current == new => StorageStatus::Unchanged,
            (true, false) => StorageStatus::Added,
            (false, true) => StorageStatus::Deleted,
            _ => StorageStatus::Modified,
        }
    }
}

/// External state and call capability
pub trait Host {
    /// Read a storage slot of `address`; unset slots read as zero
    fn get_storage(&self, address: &Address, key: &Word) -> Word;

    /// Write a storage slot of `address`
    fn set_storage(&mut self, address: &Address, key: Word, value: Word) -> StorageStatus;

    /// Block and transaction environment
    fn get_tx_context(&self) -> TxContext;

    /// Execute a nested message to completion
    fn call(&mut self, message: &Message) -> ExecutionResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_status_classify() {
        let zero = Word::ZERO;
        let one = Word::ONE;
        let two = Word::from_u64(2);
        assert_eq!(StorageStatus::classify(&zero, &zero), StorageStatus::Unchanged);
        assert_eq!(StorageStatus::classify(&one, &one), StorageStatus::Unchanged);
        assert_eq!(StorageStatus::classify(&zero, &one), StorageStatus::Added);
        assert_eq!(StorageStatus::classify(&one, &zero), StorageStatus::Deleted);
        assert_eq!(StorageStatus::classify(&one, &two), StorageStatus::Modified);
    }
}
