//! VM instance: identity, runtime options and the execution entry point

use crate::config::VmConfig;
use crate::context::Message;
use crate::error::SetOptionError;
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::result::ExecutionResult;
use crate::revision::Revision;
use tracing::debug;

/// Capabilities a VM advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u32);

impl Capabilities {
    /// Executes EVM1-style bytecode
    pub const EVM1: Capabilities = Capabilities(1);

    /// True if every capability in `other` is present
    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw flag bits
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// A configured virtual machine
///
/// Executions copy the configuration when they start, so changing options
/// never affects an execution already in progress.
#[derive(Debug, Clone, Default)]
pub struct Vm {
    config: VmConfig,
}

impl Vm {
    /// VM name
    pub const NAME: &'static str = "minivm";

    /// VM with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// VM with the given configuration. Verbosity outside [-1, 9] is
    /// clamped into range.
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Name
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Version string
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Advertised capabilities
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::EVM1
    }

    /// Set a runtime option by name.
    ///
    /// Only `verbose` is recognized. Its value is an integer in [-1, 9],
    /// written in decimal, `0x` hex or leading-zero octal; anything after the
    /// number is ignored. The configuration is left unchanged on error.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), SetOptionError> {
        if name != "verbose" {
            return Err(SetOptionError::InvalidName(name.to_string()));
        }
        let invalid = || SetOptionError::InvalidValue {
            name: name.to_string(),
            value: value.map(str::to_string),
        };

        let parsed = value.and_then(parse_integer).ok_or_else(invalid)?;
        let range = i64::from(VmConfig::MIN_VERBOSITY)..=i64::from(VmConfig::MAX_VERBOSITY);
        if !range.contains(&parsed) {
            return Err(invalid());
        }
        self.config.verbosity = parsed as i8;
        debug!(verbosity = self.config.verbosity, "option set");
        Ok(())
    }

    /// Execute `code` for `message` against `host`
    pub fn execute(
        &self,
        host: &mut dyn Host,
        revision: Revision,
        message: &Message,
        code: &[u8],
    ) -> ExecutionResult {
        Interpreter::new(self.config.clone(), revision, message, code).run(host)
    }
}

/// Parse a leading integer the way C's `strtol` does with base 0.
/// Returns `None` if no digits were consumed. Out-of-range values saturate.
fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match s.as_bytes() {
        [b'0', b'x' | b'X', next, ..] if next.is_ascii_hexdigit() => (16, &s[2..]),
        [b'0', ..] => (8, s),
        _ => (10, s),
    };

    let mut value: i64 = 0;
    let mut consumed = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        consumed = true;
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(digit));
    }

    consumed.then(|| if negative { value.saturating_neg() } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let vm = Vm::new();
        assert_eq!(vm.name(), "minivm");
        assert_eq!(vm.version(), env!("CARGO_PKG_VERSION"));
        assert!(vm.capabilities().contains(Capabilities::EVM1));
        assert_eq!(vm.capabilities().bits(), 1);
    }

    #[test]
    fn test_set_verbose() {
        let mut vm = Vm::new();
        vm.set_option("verbose", Some("1")).unwrap();
        assert_eq!(vm.config().verbosity, 1);
        vm.set_option("verbose", Some("-1")).unwrap();
        assert_eq!(vm.config().verbosity, -1);
        vm.set_option("verbose", Some("9")).unwrap();
        assert_eq!(vm.config().verbosity, 9);
        vm.set_option("verbose", Some("0x3")).unwrap();
        assert_eq!(vm.config().verbosity, 3);
        vm.set_option("verbose", Some("07")).unwrap();
        assert_eq!(vm.config().verbosity, 7);
        vm.set_option("verbose", Some("  2abc")).unwrap();
        assert_eq!(vm.config().verbosity, 2);
    }

    #[test]
    fn test_set_verbose_rejects_bad_values() {
        let mut vm = Vm::new();
        vm.set_option("verbose", Some("4")).unwrap();
        for value in ["10", "-2", "", "abc", "- 1", "99999999999999999999999"] {
            let err = vm.set_option("verbose", Some(value)).unwrap_err();
            assert!(matches!(err, SetOptionError::InvalidValue { .. }), "{value}");
        }
        assert_eq!(
            vm.set_option("verbose", None),
            Err(SetOptionError::InvalidValue {
                name: "verbose".into(),
                value: None
            })
        );
        assert_eq!(vm.config().verbosity, 4);
    }

    #[test]
    fn test_with_config_clamps_verbosity() {
        let vm = Vm::with_config(VmConfig {
            verbosity: 100,
            ..Default::default()
        });
        assert_eq!(vm.config().verbosity, 9);
    }

    #[test]
    fn test_unknown_option() {
        let mut vm = Vm::new();
        assert_eq!(
            vm.set_option("o", Some("0")),
            Err(SetOptionError::InvalidName("o".into()))
        );
        assert_eq!(vm.config().verbosity, 0);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("+5"), Some(5));
        assert_eq!(parse_integer("-0"), Some(0));
        assert_eq!(parse_integer("0x1f"), Some(31));
        assert_eq!(parse_integer("0xg"), Some(0));
        assert_eq!(parse_integer("0x"), Some(0));
        assert_eq!(parse_integer("010"), Some(8));
        assert_eq!(parse_integer("09"), Some(0));
        assert_eq!(parse_integer("\t7 "), Some(7));
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer(""), None);
    }
}
