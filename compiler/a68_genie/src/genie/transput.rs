//! `print` and `newline`.
//!
//! `print` walks rows, structures and unions down to plain values. A
//! number or truth value is separated by one space from whatever was
//! printed just before it, unless that output already ended in
//! whitespace. Procedures in a print list (`print((x, newline))`) are
//! called.

use a68_ir::StdProc;

use super::Genie;
use crate::errors::{undefined_value, value_mismatch, GenieResult};
use crate::value::{describe_mode, format_leaf, ProcValue, Value};

impl Genie<'_> {
    pub(crate) fn call_standard(&mut self, proc: StdProc, args: &[Value]) -> GenieResult {
        match proc {
            StdProc::Print => {
                for arg in args {
                    self.print_value(arg)?;
                }
            }
            StdProc::Newline => self.emit("\n"),
        }
        Ok(())
    }

    fn print_value(&mut self, value: &Value) -> GenieResult {
        match value {
            Value::Row(row) => {
                for element in row.elements.iter() {
                    self.print_value(element)?;
                }
            }
            Value::Struct(fields) => {
                for field in fields.iter() {
                    self.print_value(field)?;
                }
            }
            Value::Union { payload, .. } => self.print_value(payload)?,
            Value::Ref(name) => self.print_value(&name.get()?)?,
            Value::Proc(ProcValue::Standard(proc)) => self.call_standard(*proc, &[])?,
            Value::Proc(ProcValue::Routine { .. }) => {
                return Err(value_mismatch("printable value", value).into());
            }
            Value::Undefined(mode) => {
                return Err(undefined_value(describe_mode(&self.program.modes, *mode)).into());
            }
            Value::Int(_) | Value::Real(_) | Value::Bool(_) => {
                if self.last_char.is_some_and(|c| !c.is_whitespace()) {
                    self.emit(" ");
                }
                self.emit_leaf(value);
            }
            Value::Void | Value::Char(_) | Value::Str(_) | Value::Format(_) | Value::Nil => {
                self.emit_leaf(value);
            }
        }
        Ok(())
    }

    fn emit_leaf(&mut self, value: &Value) {
        let mut text = String::new();
        format_leaf(value, &mut text);
        self.emit(&text);
    }

    fn emit(&mut self, text: &str) {
        if let Some(last) = text.chars().last() {
            self.last_char = Some(last);
        }
        self.print_handler.print(text);
    }
}
