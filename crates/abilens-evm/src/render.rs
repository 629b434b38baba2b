//! Indented text rendering of decode results.
//!
//! Each nesting level adds two spaces. Scalars print inline after their
//! label; compound values open a block one level deeper.

use abilens_core::{
    call::{
        DecodeReport, L1RelayCall, MultiSendBatch, NestedCall, UniswapParamValue,
        UniswapRouterCall,
    },
    types::DecodedValue,
};

const INDENT: &str = "  ";

/// Render a report: the decoded tree, or a single `Error:` line.
pub fn render_report(report: &DecodeReport) -> String {
    match report {
        DecodeReport::Decoded { result } => render_value(result, 0),
        DecodeReport::Error { message } => format!("Error: {message}\n"),
    }
}

/// Render `value` starting `indent` levels deep.
pub fn render_value(value: &DecodedValue, indent: usize) -> String {
    let mut printer = Printer::default();
    printer.value(value, indent);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn line(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn value(&mut self, value: &DecodedValue, level: usize) {
        match value {
            DecodedValue::Address(_)
            | DecodedValue::Bool(_)
            | DecodedValue::Number(_)
            | DecodedValue::String(_)
            | DecodedValue::Bytes(_) => self.line(level, &value.to_string()),
            DecodedValue::Array(items) if items.is_empty() => self.line(level, "[]"),
            DecodedValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.entry(level, &format!("[{i}]"), item);
                }
            }
            DecodedValue::Tuple(fields) => {
                for (name, item) in fields {
                    self.entry(level, name, item);
                }
            }
            DecodedValue::NestedCall(call) => self.call(call, level),
            DecodedValue::MultiSend(batch) => self.multisend(batch, level),
            DecodedValue::UniswapRouter(call) => self.router(call, level),
            DecodedValue::L1Relay(relay) => self.relay(relay, level),
        }
    }

    fn entry(&mut self, level: usize, label: &str, value: &DecodedValue) {
        match inline_text(value) {
            Some(text) => self.line(level, &format!("{label}: {text}")),
            None => {
                self.line(level, &format!("{label}:"));
                self.value(value, level + 1);
            }
        }
    }

    fn call(&mut self, call: &NestedCall, level: usize) {
        self.line(level, &format!("Function: {}", call.signature));
        self.line(level, &format!("Selector: {}", call.selector));
        if call.parameters.is_empty() {
            self.line(level, "Parameters: none");
        } else {
            self.line(level, "Parameters:");
            for (name, value) in &call.parameters {
                self.entry(level + 1, name, value);
            }
        }
        self.line(level, &format!("Raw Data: {}", call.raw));
    }

    fn multisend(&mut self, batch: &MultiSendBatch, level: usize) {
        self.line(
            level,
            &format!("Multi-send batch ({} transactions)", batch.transactions.len()),
        );
        for (i, tx) in batch.transactions.iter().enumerate() {
            self.line(level + 1, &format!("Transaction {}:", i + 1));
            self.line(level + 2, &format!("Operation: {}", tx.operation));
            self.line(level + 2, &format!("To: {}", tx.to));
            self.line(level + 2, &format!("Value: {}", tx.value));
            self.line(level + 2, &format!("Data length: {} bytes", tx.data_length));
            self.entry(level + 2, "Data", &tx.data);
        }
    }

    fn router(&mut self, call: &UniswapRouterCall, level: usize) {
        self.line(level, "Uniswap Universal Router");
        if let Some(deadline) = &call.deadline {
            self.line(level, &format!("Deadline: {deadline}"));
        }
        self.line(level, "Commands:");
        for (i, command) in call.commands.iter().enumerate() {
            self.line(
                level + 1,
                &format!("{}. {} (0x{:02x})", i + 1, command.name, command.index),
            );
            for param in &command.params {
                let label = format!("{} ({})", param.name, param.ty);
                match &param.value {
                    UniswapParamValue::Value(value) => self.entry(level + 2, &label, value),
                    UniswapParamValue::Path(hops) => {
                        self.line(level + 2, &format!("{label}:"));
                        for hop in hops {
                            self.line(
                                level + 3,
                                &format!(
                                    "{} -> [{}] -> {}",
                                    hop.first_address, hop.tick_spacing, hop.second_address
                                ),
                            );
                        }
                    }
                }
            }
        }
    }

    fn relay(&mut self, relay: &L1RelayCall, level: usize) {
        self.line(level, "zkSync sendToL1");
        self.line(level, &format!("Executor: {}", relay.executor));
        self.line(level, &format!("Salt: {}", relay.salt));
        self.line(level, "Operations:");
        for (i, op) in relay.operations.iter().enumerate() {
            self.line(level + 1, &format!("Operation {}:", i + 1));
            self.line(level + 2, &format!("Target: {}", op.target));
            self.line(level + 2, &format!("Value: {}", op.value));
            self.entry(level + 2, "Calldata", &op.calldata);
        }
    }
}

/// Single-line text for scalars; `None` for anything that needs a block.
fn inline_text(value: &DecodedValue) -> Option<String> {
    match value {
        DecodedValue::Address(_)
        | DecodedValue::Bool(_)
        | DecodedValue::Number(_)
        | DecodedValue::String(_)
        | DecodedValue::Bytes(_) => Some(value.to_string()),
        DecodedValue::Array(items) if items.is_empty() => Some("[]".into()),
        DecodedValue::Array(_)
        | DecodedValue::Tuple(_)
        | DecodedValue::NestedCall(_)
        | DecodedValue::MultiSend(_)
        | DecodedValue::UniswapRouter(_)
        | DecodedValue::L1Relay(_) => None,
    }
}
