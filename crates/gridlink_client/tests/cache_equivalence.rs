//! The materialized cache must equal the row set computed directly from
//! the event history: a snapshot plus any interleaving of deltas lands on
//! the same visible rows as counting deliveries per row.

use gridlink_client::{Connection, ConnectionConfig, MockTransport};
use gridlink_codec::{to_bsatn, AlgebraicType, AlgebraicValue, ProductValue};
use gridlink_protocol::{
    InitialSnapshot, ServerFrame, TableDelta, TableSnapshot, TransactionUpdate,
};
use gridlink_schema::{ColumnBuilder, TableBuilder, TableDef};
use proptest::prelude::*;

const EVENTS: u32 = 2;

/// Candidate rows the generated history draws from.
const DOMAIN: usize = 5;

fn events_table() -> TableDef {
    TableBuilder::new("events")
        .public()
        .column(ColumnBuilder::new("payload", AlgebraicType::String))
        .build()
}

fn row(i: usize) -> Vec<u8> {
    to_bsatn(&AlgebraicValue::Product(ProductValue {
        elements: vec![AlgebraicValue::String(format!("row-{i}"))],
    }))
}

proptest! {
    /// Each op is (insert, row index); ops grouped into one inner vec share
    /// a transaction. Without a primary key, visibility is pure reference
    /// counting: a row is visible while deliveries outnumber deletes.
    #[test]
    fn cache_matches_directly_materialized_rows(
        initial in proptest::collection::vec(0..DOMAIN, 0..8),
        frames in proptest::collection::vec(
            proptest::collection::vec((any::<bool>(), 0..DOMAIN), 0..5),
            0..10,
        ),
    ) {
        let mut conn = Connection::new(
            ConnectionConfig::new("wss://grid.example.com", "game"),
            MockTransport::new(),
        );
        conn.subscribe(vec!["SELECT * FROM events".into()]).unwrap();
        conn.transport_mut()
            .push_frame(&ServerFrame::InitialSnapshot(InitialSnapshot {
                request_id: 0,
                tables: vec![TableSnapshot {
                    table_id: EVENTS,
                    table: events_table(),
                    rows: initial.iter().map(|&i| row(i)).collect(),
                }],
            }));
        prop_assert!(conn.advance().unwrap());

        let mut counts = [0u32; DOMAIN];
        for &i in &initial {
            counts[i] += 1;
        }

        for (event_id, ops) in frames.iter().enumerate() {
            let inserts = ops.iter().filter(|&&(ins, _)| ins).map(|&(_, i)| row(i)).collect();
            let deletes = ops.iter().filter(|&&(ins, _)| !ins).map(|&(_, i)| row(i)).collect();
            conn.transport_mut()
                .push_frame(&ServerFrame::TransactionUpdate(TransactionUpdate {
                    event_id: event_id as u64 + 1,
                    call_result: None,
                    deltas: vec![TableDelta {
                        table_id: EVENTS,
                        inserts,
                        deletes,
                    }],
                }));

            // Deletes apply before inserts within one transaction; a delete
            // of an absent row is a no-op.
            for &(ins, i) in ops {
                if !ins && counts[i] > 0 {
                    counts[i] -= 1;
                }
            }
            for &(ins, i) in ops {
                if ins {
                    counts[i] += 1;
                }
            }
        }
        let applied = conn.drain().unwrap();
        prop_assert_eq!(applied as usize, frames.len());

        let mut got: Vec<String> = conn
            .rows("events")
            .iter()
            .map(|r| r.elements[0].as_string().unwrap().to_string())
            .collect();
        got.sort();
        let expected: Vec<String> = (0..DOMAIN)
            .filter(|&i| counts[i] > 0)
            .map(|i| format!("row-{i}"))
            .collect();
        prop_assert_eq!(got, expected);
    }
}
