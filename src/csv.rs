use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::ledger::WalletSummary;
use crate::{Amount, Operation, UserId};

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized operation '{op}'")]
    UnrecognizedOp { line: usize, op: String },

    #[error("line {line}: {op} missing {field}")]
    MissingField {
        line: usize,
        op: String,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    op: String,
    user: UserId,
    target: Option<String>,
    detail: Option<String>,
    amount: f64,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    user: UserId,
    balance: String,
    credits: u64,
    debits: u64,
}

fn required(
    field: Option<String>,
    line: usize,
    op: &str,
    name: &'static str,
) -> Result<String, CsvError> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CsvError::MissingField {
            line,
            op: op.to_string(),
            field: name,
        }),
    }
}

/// Read wallet operations from a csv file
pub fn read_operations(
    path: impl AsRef<Path>,
) -> impl Iterator<Item = Result<Operation, CsvError>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .expect("failed to open csv file");

    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let amount = Amount::from_float(row.amount);
            match row.op.as_str() {
                "fund" => Ok(Operation::Fund {
                    user: row.user,
                    amount,
                }),
                "transfer" => Ok(Operation::Transfer {
                    user: row.user,
                    to: required(row.target, line, "transfer", "target")?,
                    amount,
                }),
                "upi" => Ok(Operation::TransferUpi {
                    user: row.user,
                    address: required(row.target, line, "upi", "target")?,
                    amount,
                }),
                "bank" => Ok(Operation::TransferBank {
                    user: row.user,
                    recipient: required(row.target, line, "bank", "target")?,
                    account_number: required(row.detail, line, "bank", "detail")?,
                    amount,
                }),
                other => Err(CsvError::UnrecognizedOp {
                    line,
                    op: other.to_string(),
                }),
            }
        })
}

/// Write wallet summaries as csv to stdout
pub fn write_balances(rows: impl IntoIterator<Item = WalletSummary>) {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer
            .serialize(OutputRow {
                user: row.user,
                balance: row.balance.to_string(),
                credits: row.credits,
                debits: row.debits,
            })
            .expect("failed to write csv row");
    }
    writer.flush().expect("failed to flush csv output");
}
