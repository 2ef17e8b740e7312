//! Streaming history ingestion and report output for the CLI harness.
//!
//! Reads one group's history CSV row by row into the in-memory store,
//! computing and materializing shares at expense-recording time, then
//! writes the balance report. Invalid rows are logged at warn level and
//! skipped; the rest of the history still applies.

use crate::error::Result;
use crate::history::{HistoryEvent, HistoryRecord};
use crate::model::{GroupId, MemberId, UserProfile};
use crate::service::{GroupBalanceReport, LedgerService};
use crate::store::MemoryStore;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Ingests a single group's history and produces its balance report.
///
/// # Output Ordering
///
/// Balance rows are sorted by member id ascending; transfer rows follow in
/// the simplifier's deterministic emission order.
pub struct LedgerEngine {
    store: MemoryStore,
    directory: HashMap<MemberId, UserProfile>,
    group: GroupId,
}

impl LedgerEngine {
    /// Creates an engine with an empty history group.
    pub fn new() -> Self {
        let group = GroupId::from("history");
        let mut store = MemoryStore::new();
        store.create_group(&group);

        LedgerEngine {
            store,
            directory: HashMap::new(),
            group,
        }
    }

    /// Processes history records from a CSV reader in streaming fashion.
    ///
    /// Records are read one at a time. Invalid rows are logged at warn
    /// level and skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<HistoryRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => match record.parse() {
                    Ok(event) => {
                        if let Err(e) = self.apply(event, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    }
                    Err(e) => {
                        warn!("Row {}: {}", row_num, e);
                    }
                },
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(())
    }

    /// Applies a single parsed history event to the store.
    fn apply(&mut self, event: HistoryEvent, row: usize) -> Result<()> {
        match event {
            HistoryEvent::Member { id, profile } => {
                self.store.add_member(&self.group, id.clone());
                if let Some(profile) = profile {
                    self.directory.insert(id.clone(), profile);
                }
                debug!("Row {}: Declared member {}", row, id);
            }
            HistoryEvent::Expense {
                payer,
                amount,
                policy,
            } => {
                let id = self
                    .store
                    .record_expense(&self.group, payer.clone(), amount, policy)?;
                debug!(
                    "Row {}: Recorded expense {} of {} paid by {}",
                    row, id, amount, payer
                );
            }
            HistoryEvent::Settlement { from, to, amount } => {
                let id = self
                    .store
                    .record_settlement(&self.group, from.clone(), to.clone(), amount)?;
                debug!(
                    "Row {}: Recorded settlement {} of {} from {} to {}",
                    row, id, amount, from, to
                );
            }
        }

        Ok(())
    }

    /// Computes the balance report for the ingested history.
    pub fn report(&self) -> Result<GroupBalanceReport> {
        let service = LedgerService::new(&self.store, &self.directory);
        service.group_balances(&self.group)
    }

    /// Writes the balance report as CSV.
    ///
    /// Balance rows carry the rounded net per member; transfer rows carry
    /// the suggested settlements.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let report = self.report()?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["record", "member", "counterparty", "amount"])?;

        for summary in &report.members {
            csv_writer.write_record([
                "balance".to_string(),
                summary.member.to_string(),
                String::new(),
                summary.net.to_string(),
            ])?;
        }

        for transfer in &report.transfers {
            csv_writer.write_record([
                "transfer".to_string(),
                transfer.from.to_string(),
                transfer.to.to_string(),
                transfer.amount.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
