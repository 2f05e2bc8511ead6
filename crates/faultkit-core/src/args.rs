//! Constructor-argument normalization.
//!
//! Contract: given the positional construction arguments, the first textual
//! argument becomes the `message` override; every other argument becomes a
//! `values` entry, order preserved.

use crate::transport::AuxValue;

/// Normalized construction arguments.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    /// Message override, taken from the first textual argument if any.
    pub message: Option<String>,
    /// Every remaining argument, in original order.
    pub values: Vec<AuxValue>,
}

/// Classify positional arguments into `{message?, values}`.
pub fn parse<I>(args: I) -> ParsedArgs
where
    I: IntoIterator<Item = AuxValue>,
{
    let mut parsed = ParsedArgs::default();
    for arg in args {
        if parsed.message.is_none() && arg.is_text() {
            match arg {
                AuxValue::Data(serde_json::Value::String(s)) => parsed.message = Some(s),
                _ => unreachable!("is_text matched a non-string"),
            }
        } else {
            parsed.values.push(arg);
        }
    }
    parsed
}
