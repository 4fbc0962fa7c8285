//! Fuzz target for LHS table snapshot decoding.
//!
//! Arbitrary bytes must decode to an error or to a table that re-encodes
//! to a decodable snapshot; decoding must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gcf_search::lhs::LhsTable;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = LhsTable::from_snapshot_bytes(data) else {
        return;
    };
    let bytes = table.to_snapshot_bytes().expect("re-encode decoded table");
    let again = LhsTable::from_snapshot_bytes(&bytes).expect("decode re-encoded table");
    assert_eq!(again, table);
});
