//! Safe multi-send batch format.
//!
//! A batch is a tight concatenation of records:
//!
//! ```text
//! operation (1) | to (20) | value (32, BE) | data length L (32, BE) | data (L)
//! ```
//!
//! The parser is opportunistic: an operation byte other than 0 or 1 means
//! the blob is not a batch at all, while a record that runs past the end
//! of the buffer only stops the scan.

use alloy_primitives::U256;
use abilens_core::{
    call::{MultiSendBatch, MultiSendTransaction, Operation},
    hexutil::encode_hex,
    types::DecodedValue,
};

/// operation + to + value + data length
pub const RECORD_HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// One record, borrowing its payload from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSendRecord<'a> {
    pub operation: Operation,
    pub to: [u8; 20],
    pub value: U256,
    pub data: &'a [u8],
}

impl MultiSendRecord<'_> {
    /// The record as a result entry, with its payload as raw bytes.
    pub fn to_transaction(&self) -> MultiSendTransaction {
        self.to_transaction_with(DecodedValue::Bytes(encode_hex(self.data)))
    }

    /// The record as a result entry, with an already-processed payload.
    pub fn to_transaction_with(&self, data: DecodedValue) -> MultiSendTransaction {
        MultiSendTransaction {
            operation: self.operation,
            to: encode_hex(self.to),
            value: self.value.to_string(),
            data_length: self.data.len() as u64,
            data,
        }
    }
}

/// Parse `blob` as a batch. `None` unless at least one record is well formed.
pub fn parse(blob: &[u8]) -> Option<Vec<MultiSendRecord<'_>>> {
    let mut records = Vec::new();
    let mut offset = 0;

    while blob.len() - offset >= RECORD_HEADER_LEN {
        let header = &blob[offset..offset + RECORD_HEADER_LEN];
        let operation = Operation::from_byte(header[0])?;
        let mut to = [0u8; 20];
        to.copy_from_slice(&header[1..21]);
        let value = U256::from_be_slice(&header[21..53]);

        let start = offset + RECORD_HEADER_LEN;
        let Some(end) = word_to_usize(&header[53..85])
            .and_then(|len| start.checked_add(len))
            .filter(|&end| end <= blob.len())
        else {
            break;
        };

        records.push(MultiSendRecord {
            operation,
            to,
            value,
            data: &blob[start..end],
        });
        offset = end;
    }

    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// Parse and convert straight to a result, payloads left as raw bytes.
pub fn decode(blob: &[u8]) -> Option<MultiSendBatch> {
    let records = parse(blob)?;
    Some(MultiSendBatch {
        transactions: records.iter().map(MultiSendRecord::to_transaction).collect(),
    })
}

/// Pack records into the batch format.
pub fn pack(records: &[MultiSendRecord<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for r in records {
        out.push(r.operation.as_byte());
        out.extend_from_slice(&r.to);
        out.extend_from_slice(&r.value.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(r.data.len()).to_be_bytes::<32>());
        out.extend_from_slice(r.data);
    }
    out
}

/// A 32-byte big-endian word as `usize`, if it fits.
fn word_to_usize(word: &[u8]) -> Option<usize> {
    let (high, low) = word.split_at(word.len().checked_sub(8)?);
    if high.iter().any(|&b| b != 0) {
        return None;
    }
    let low: [u8; 8] = low.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(low)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> Vec<u8> {
        let transfer = hex::decode(
            "a9059cbb000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045\
             00000000000000000000000000000000000000000000000000000000000f4240",
        )
        .unwrap();
        pack(&[
            MultiSendRecord {
                operation: Operation::Call,
                to: [0x11; 20],
                value: U256::from(1_000_000_000_000_000_000u128),
                data: &[],
            },
            MultiSendRecord {
                operation: Operation::DelegateCall,
                to: [0x22; 20],
                value: U256::ZERO,
                data: &transfer,
            },
        ])
    }

    #[test]
    fn two_record_batch() {
        let blob = sample_batch();
        let batch = decode(&blob).unwrap();
        assert_eq!(batch.transactions.len(), 2);

        let first = &batch.transactions[0];
        assert_eq!(first.operation, Operation::Call);
        assert_eq!(first.to, format!("0x{}", "11".repeat(20)));
        assert_eq!(first.value, "1000000000000000000");
        assert_eq!(first.data_length, 0);
        assert_eq!(first.data, DecodedValue::Bytes("0x".into()));

        let second = &batch.transactions[1];
        assert_eq!(second.operation, Operation::DelegateCall);
        assert_eq!(second.value, "0");
        assert_eq!(second.data_length, 68);
    }

    #[test]
    fn bad_operation_byte_is_no_match() {
        let mut blob = sample_batch();
        blob[0] = 0x02;
        assert!(parse(&blob).is_none());
    }

    #[test]
    fn bad_operation_in_later_record_discards_everything() {
        let mut blob = sample_batch();
        blob[RECORD_HEADER_LEN] = 0x07;
        assert!(parse(&blob).is_none());
    }

    #[test]
    fn overrun_keeps_earlier_records() {
        let mut blob = sample_batch();
        blob.truncate(blob.len() - 10);
        let records = parse(&blob).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn short_or_empty_is_no_match() {
        assert!(parse(&[]).is_none());
        assert!(parse(&[0u8; RECORD_HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn absurd_length_stops_scan() {
        let mut blob = vec![0u8; RECORD_HEADER_LEN];
        blob[53] = 0xff;
        assert!(parse(&blob).is_none());
    }
}
