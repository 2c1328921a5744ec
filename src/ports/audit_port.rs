//! Audit sink port trait.

use crate::domain::audit::AuditRecord;
use crate::domain::error::EngineError;

/// Append-only receiver of audit records, in emission order.
pub trait AuditSink {
    fn write_record(&mut self, record: &AuditRecord) -> Result<(), EngineError>;

    fn write_many(&mut self, records: &[AuditRecord]) -> Result<(), EngineError> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    fn records_written(&self) -> usize;

    /// Flush and release any underlying handles.
    fn close(&mut self) -> Result<(), EngineError>;
}
