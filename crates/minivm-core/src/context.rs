//! Execution inputs: the message being executed and the transaction context

use bytes::Bytes;
use minivm_primitives::{Address, Word};

/// Kind of call a message describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallKind {
    /// Plain message call
    #[default]
    Call,
    /// Call executing the target's code in the caller's context
    DelegateCall,
    /// Legacy variant of DelegateCall
    CallCode,
    /// Contract creation
    Create,
    /// Contract creation at a salted address
    Create2,
}

/// Message flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageFlags {
    /// No state modification allowed
    pub is_static: bool,
}

impl MessageFlags {
    /// Static flag bit
    pub const STATIC: u32 = 1;

    /// Flags as a bit set
    pub fn bits(&self) -> u32 {
        if self.is_static {
            Self::STATIC
        } else {
            0
        }
    }
}

/// One execution request, top-level or nested
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Call kind
    pub kind: CallKind,
    /// Flags
    pub flags: MessageFlags,
    /// Nesting depth, 0 for the top-level call
    pub depth: i32,
    /// Gas made available to the execution
    pub gas: i64,
    /// Account whose code runs and whose storage is accessed
    pub destination: Address,
    /// Caller
    pub sender: Address,
    /// Transferred value
    pub value: Word,
    /// Call data
    pub input: Bytes,
    /// Account the code was loaded from
    pub code_address: Address,
}

impl Message {
    /// Top-level call from `sender` to `destination` with `gas`
    pub fn call(sender: Address, destination: Address, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            gas,
            destination,
            sender,
            code_address: destination,
            ..Default::default()
        }
    }

    /// Replace the call data
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Replace the transferred value
    pub fn with_value(mut self, value: Word) -> Self {
        self.value = value;
        self
    }

    /// Replace the gas budget
    pub fn with_gas(mut self, gas: i64) -> Self {
        self.gas = gas;
        self
    }

    /// Mark as static
    pub fn into_static(mut self) -> Self {
        self.flags.is_static = true;
        self
    }

    /// True inside a static call
    pub fn is_static(&self) -> bool {
        self.flags.is_static
    }
}

/// Block and transaction environment provided by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    /// Gas price
    pub gas_price: Word,
    /// Transaction origin
    pub origin: Address,
    /// Block beneficiary
    pub coinbase: Address,
    /// Block number
    pub block_number: u64,
    /// Block timestamp
    pub block_timestamp: u64,
    /// Block gas limit
    pub block_gas_limit: u64,
    /// Randomness beacon (formerly difficulty)
    pub prev_randao: Word,
    /// Chain ID
    pub chain_id: Word,
    /// Base fee
    pub base_fee: Word,
}

impl Default for TxContext {
    fn default() -> Self {
        Self {
            gas_price: Word::ZERO,
            origin: Address::ZERO,
            coinbase: Address::ZERO,
            block_number: 0,
            block_timestamp: 0,
            block_gas_limit: 30_000_000,
            prev_randao: Word::ZERO,
            chain_id: Word::ONE,
            base_fee: Word::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_call() {
        let sender = Address::from_bytes([0x11; 20]);
        let destination = Address::from_bytes([0x22; 20]);
        let msg = Message::call(sender, destination, 1000);

        assert_eq!(msg.kind, CallKind::Call);
        assert_eq!(msg.sender, sender);
        assert_eq!(msg.destination, destination);
        assert_eq!(msg.code_address, destination);
        assert_eq!(msg.gas, 1000);
        assert_eq!(msg.depth, 0);
        assert!(msg.input.is_empty());
        assert!(!msg.is_static());
    }

    #[test]
    fn test_message_builders() {
        let msg = Message::default()
            .with_input(vec![1, 2, 3])
            .with_value(Word::from_u64(5))
            .with_gas(7)
            .into_static();
        assert_eq!(&msg.input[..], &[1, 2, 3]);
        assert_eq!(msg.value, Word::from_u64(5));
        assert_eq!(msg.gas, 7);
        assert!(msg.is_static());
        assert_eq!(msg.flags.bits(), MessageFlags::STATIC);
    }

    #[test]
    fn test_default_flags_are_zero() {
        assert_eq!(MessageFlags::default().bits(), 0);
    }

    #[test]
    fn test_tx_context_default() {
        let ctx = TxContext::default();
        assert_eq!(ctx.block_number, 0);
        assert_eq!(ctx.block_gas_limit, 30_000_000);
        assert_eq!(ctx.chain_id, Word::ONE);
        assert!(ctx.origin.is_zero());
    }
}
