//! Bounded operand stack

use crate::error::{VmError, VmResult};
use minivm_primitives::Word;

/// Maximum number of items on the stack
pub const STACK_LIMIT: usize = 1024;

/// LIFO stack of words, never larger than [`STACK_LIMIT`]
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<Word>,
}

impl Stack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(STACK_LIMIT),
        }
    }

    /// Push onto the top
    pub fn push(&mut self, value: Word) -> VmResult<()> {
        if self.data.len() >= STACK_LIMIT {
            return Err(VmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Remove and return the top
    pub fn pop(&mut self) -> VmResult<Word> {
        self.data.pop().ok_or(VmError::StackUnderflow)
    }

    /// Read the item `depth` places below the top (0 = top)
    pub fn peek(&self, depth: usize) -> VmResult<&Word> {
        if depth >= self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Push a copy of the `n`-th item (1 = top)
    pub fn dup(&mut self, n: usize) -> VmResult<()> {
        if n == 0 || n > self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        let value = self.data[self.data.len() - n];
        self.push(value)
    }

    /// Exchange the top with the item `n` places below it
    pub fn swap(&mut self, n: usize) -> VmResult<()> {
        if n == 0 || n >= self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        let top = self.data.len() - 1;
        self.data.swap(top, top - n);
        Ok(())
    }

    /// Check that an instruction consuming `inputs` and producing `outputs`
    /// items can run without underflow or overflow
    pub fn require(&self, inputs: usize, outputs: usize) -> VmResult<()> {
        let len = self.data.len();
        if len < inputs {
            return Err(VmError::StackUnderflow);
        }
        if outputs > inputs && len - inputs + outputs > STACK_LIMIT {
            return Err(VmError::StackOverflow);
        }
        Ok(())
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Items from bottom to top
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: u64) -> Word {
        Word::from_u64(n)
    }

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        stack.push(w(2)).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), w(2));
        assert_eq!(stack.pop().unwrap(), w(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(VmError::StackUnderflow));
    }

    #[test]
    fn test_overflow_at_limit() {
        let mut stack = Stack::new();
        for i in 0..STACK_LIMIT {
            stack.push(w(i as u64)).unwrap();
        }
        assert_eq!(stack.push(w(0)), Err(VmError::StackOverflow));
        assert_eq!(stack.len(), STACK_LIMIT);
    }

    #[test]
    fn test_peek() {
        let mut stack = Stack::new();
        stack.push(w(10)).unwrap();
        stack.push(w(20)).unwrap();
        assert_eq!(*stack.peek(0).unwrap(), w(20));
        assert_eq!(*stack.peek(1).unwrap(), w(10));
        assert_eq!(stack.peek(2), Err(VmError::StackUnderflow));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_dup() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        stack.push(w(2)).unwrap();
        stack.dup(1).unwrap();
        assert_eq!(stack.as_slice(), &[w(1), w(2), w(2)]);
        stack.dup(3).unwrap();
        assert_eq!(*stack.peek(0).unwrap(), w(1));
        assert_eq!(stack.dup(5), Err(VmError::StackUnderflow));
        assert_eq!(stack.dup(0), Err(VmError::StackUnderflow));
    }

    #[test]
    fn test_dup_full_stack_overflows() {
        let mut stack = Stack::new();
        for _ in 0..STACK_LIMIT {
            stack.push(w(7)).unwrap();
        }
        assert_eq!(stack.dup(1), Err(VmError::StackOverflow));
    }

    #[test]
    fn test_swap() {
        let mut stack = Stack::new();
        stack.push(w(1)).unwrap();
        stack.push(w(2)).unwrap();
        stack.push(w(3)).unwrap();
        stack.swap(2).unwrap();
        assert_eq!(stack.as_slice(), &[w(3), w(2), w(1)]);
        assert_eq!(stack.swap(3), Err(VmError::StackUnderflow));
    }

    #[test]
    fn test_swap_on_empty_stack() {
        let mut stack = Stack::new();
        assert_eq!(stack.swap(1), Err(VmError::StackUnderflow));
    }

    #[test]
    fn test_require() {
        let mut stack = Stack::new();
        assert_eq!(stack.require(1, 1), Err(VmError::StackUnderflow));
        assert!(stack.require(0, 1).is_ok());
        for _ in 0..STACK_LIMIT {
            stack.push(Word::ZERO).unwrap();
        }
        assert_eq!(stack.require(0, 1), Err(VmError::StackOverflow));
        assert!(stack.require(2, 1).is_ok());
        assert!(stack.require(1, 1).is_ok());
    }
}
