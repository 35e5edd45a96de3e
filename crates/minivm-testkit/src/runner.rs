//! Fixture runner and statistics

use crate::error::{TestError, TestResult};
use crate::mocked_host::MockedHost;
use crate::types::{Fixture, FixtureFile};
use minivm_core::{ExecutionResult, Message, MessageFlags, TxContext, Vm};
use minivm_primitives::Word;
use std::path::Path;

/// Outcome of every case in one fixture file
#[derive(Debug, Default)]
pub struct FixtureResults {
    /// Source file
    pub file: String,
    /// Passed case names
    pub passed: Vec<String>,
    /// Failed case names with reasons
    pub failed: Vec<(String, String)>,
}

impl FixtureResults {
    /// Create empty results for `file`
    pub fn new(file: String) -> Self {
        Self {
            file,
            ..Default::default()
        }
    }

    /// Number of cases run
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// True when nothing failed
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs fixture cases against a [`Vm`] and a fresh [`MockedHost`] each
pub struct FixtureRunner {
    vm: Vm,
    verbose: bool,
}

impl FixtureRunner {
    /// Runner over `vm`
    pub fn new(vm: Vm, verbose: bool) -> Self {
        Self { vm, verbose }
    }

    /// Run all cases in a file
    pub fn run_file(&self, path: &Path) -> TestResult<FixtureResults> {
        let content = std::fs::read_to_string(path)?;
        self.run_json(&path.to_string_lossy(), &content)
    }

    /// Run all cases in a JSON document
    pub fn run_json(&self, source: &str, json: &str) -> TestResult<FixtureResults> {
        let fixtures: FixtureFile = serde_json::from_str(json)?;
        let mut results = FixtureResults::new(source.to_string());

        for (name, fixture) in fixtures {
            match self.run_fixture(&fixture) {
                Ok(()) => {
                    if self.verbose {
                        tracing::info!("PASS: {}", name);
                    }
                    results.passed.push(name);
                }
                Err(e) => {
                    if self.verbose {
                        tracing::warn!("FAIL: {} - {}", name, e);
                    }
                    results.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(results)
    }

    /// Run a single case
    pub fn run_fixture(&self, fixture: &Fixture) -> TestResult<()> {
        let mut host = build_host(fixture);
        let message = build_message(fixture);
        let result = self
            .vm
            .execute(&mut host, fixture.revision, &message, &fixture.exec.code.0);
        check_result(fixture, &result, &host)
    }
}

fn build_host(fixture: &Fixture) -> MockedHost {
    let mut host = MockedHost::new();
    host.tx_context = TxContext {
        block_number: fixture.env.number,
        block_timestamp: fixture.env.timestamp,
        origin: fixture.env.origin.0,
        chain_id: fixture.env.chain_id.map_or(Word::ONE, |id| id.0),
        ..TxContext::default()
    };
    if let Some(call) = &fixture.call_result {
        host.call_result =
            ExecutionResult::new(call.status, call.gas_left, call.output.0.clone().into());
    }
    for (address, slots) in &fixture.pre {
        for (key, value) in slots {
            host.set_storage_at(address.0, key.0, value.0);
        }
    }
    host
}

fn build_message(fixture: &Fixture) -> Message {
    let exec = &fixture.exec;
    let mut message = Message::call(exec.caller.0, exec.address.0, exec.gas)
        .with_input(exec.data.0.clone())
        .with_value(exec.value.0);
    message.depth = exec.depth;
    message.flags = MessageFlags {
        is_static: exec.is_static,
    };
    message
}

fn check_result(fixture: &Fixture, result: &ExecutionResult, host: &MockedHost) -> TestResult<()> {
    let expect = &fixture.expect;

    if result.status() != expect.status {
        return Err(TestError::Assertion(format!(
            "status mismatch: expected {}, got {}",
            expect.status,
            result.status()
        )));
    }

    if result.gas_left() != expect.gas_left {
        return Err(TestError::Assertion(format!(
            "gas_left mismatch: expected {}, got {}",
            expect.gas_left,
            result.gas_left()
        )));
    }

    if result.output() != expect.output.0.as_slice() {
        return Err(TestError::Assertion(format!(
            "output mismatch: expected 0x{}, got 0x{}",
            hex::encode(&expect.output.0),
            hex::encode(result.output())
        )));
    }

    for (address, slots) in &expect.storage {
        for (key, value) in slots {
            let actual = host.storage_at(&address.0, &key.0);
            if actual != value.0 {
                return Err(TestError::Assertion(format!(
                    "storage mismatch at {} slot {}: expected {}, got {}",
                    address.0, key.0, value.0, actual
                )));
            }
        }
    }

    if let Some(calls) = expect.calls {
        if host.recorded_calls.len() != calls {
            return Err(TestError::Assertion(format!(
                "call count mismatch: expected {}, got {}",
                calls,
                host.recorded_calls.len()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &str = r#"{
        "empty_code": {
            "exec": { "code": "", "gas": 999 },
            "expect": { "status": "success", "gas_left": 999 }
        },
        "wrong_gas": {
            "exec": { "code": "00", "gas": 10 },
            "expect": { "status": "success", "gas_left": 10 }
        }
    }"#;

    #[test]
    fn test_run_json_reports_pass_and_fail() {
        let runner = FixtureRunner::new(Vm::new(), false);
        let results = runner.run_json("inline", FIXTURES).unwrap();
        assert_eq!(results.total(), 2);
        assert_eq!(results.passed, vec!["empty_code".to_string()]);
        assert_eq!(results.failed.len(), 1);
        assert!(results.failed[0].1.contains("gas_left mismatch"));
        assert!(!results.all_passed());
    }

    #[test]
    fn test_invalid_json() {
        let runner = FixtureRunner::new(Vm::new(), false);
        assert!(matches!(
            runner.run_json("inline", "{"),
            Err(TestError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let runner = FixtureRunner::new(Vm::new(), false);
        let err = runner
            .run_file(Path::new("/nonexistent/fixtures.json"))
            .unwrap_err();
        assert!(matches!(err, TestError::Io(_)));
    }
}
