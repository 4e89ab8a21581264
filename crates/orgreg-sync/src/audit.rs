//! Audit log sink — an append-only line writer.
//!
//! The upsert engine emits one line per applied change, recording before and
//! after values of the traceable fields. The sink itself is a collaborator
//! owned by the caller, so it sits behind a trait.

use std::sync::Mutex;

pub trait AuditSink: Send + Sync {
  fn append(&self, line: &str);
}

/// Emits audit lines through the tracing stack under the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
  fn append(&self, line: &str) {
    tracing::info!(target: "audit", "{line}");
  }
}

/// Collects audit lines in memory; test support.
#[derive(Debug, Default)]
pub struct MemoryAudit {
  lines: Mutex<Vec<String>>,
}

impl MemoryAudit {
  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }
}

impl AuditSink for MemoryAudit {
  fn append(&self, line: &str) {
    self.lines.lock().unwrap().push(line.to_string());
  }
}
