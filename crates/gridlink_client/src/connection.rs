//! The client connection.
//!
//! A [`Connection`] owns a transport and drives the whole client side:
//! subscriptions, the materialized row caches, row observers, and in-flight
//! reducer calls. Frames are processed strictly in arrival order by
//! [`advance`](Connection::advance); all per-event work (cache mutation,
//! then row callbacks, then call resolution) completes before the next
//! frame is touched.

use crate::cache::{row_key, DeleteOutcome, InsertOutcome, TableCache};
use crate::callbacks::{CallbackId, EventContext, TableCallbacks};
use crate::config::ConnectionConfig;
use crate::error::{ClientError, ClientResult};
use crate::pending::{CallOutcome, CallToken, PendingCalls};
use crate::state::ConnectionState;
use crate::transport::FrameTransport;
use gridlink_codec::{
    from_bsatn, to_bsatn, AlgebraicType, AlgebraicValue, CodecError, ProductType, ProductValue,
    Typespace,
};
use gridlink_protocol::{
    CallReducer, CallStatus, ClientFrame, InitialSnapshot, ServerFrame, Subscribe,
    TransactionUpdate, Unsubscribe,
};
use gridlink_schema::TableDef;
use std::collections::HashMap;
use tracing::{debug, warn};

struct TableEntry {
    def: TableDef,
    row_type: AlgebraicType,
    cache: TableCache,
}

/// Row changes produced by one event for one table, in post-state form.
struct TableChanges {
    table: String,
    inserts: Vec<ProductValue>,
    deletes: Vec<ProductValue>,
    updates: Vec<(ProductValue, ProductValue)>,
}

/// A connection to a GridLink database.
pub struct Connection<T: FrameTransport> {
    config: ConnectionConfig,
    transport: T,
    state: ConnectionState,
    typespace: Typespace,
    tables: HashMap<u32, TableEntry>,
    ids_by_name: HashMap<String, u32>,
    callbacks: HashMap<String, TableCallbacks>,
    pending: PendingCalls,
    next_request_id: u32,
    stale: bool,
}

impl<T: FrameTransport> Connection<T> {
    /// Creates a connection over an established transport.
    pub fn new(config: ConnectionConfig, transport: T) -> Self {
        let state = if transport.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Connecting
        };
        debug!(database = %config.database, state = ?state, "connection created");
        Self {
            config,
            transport,
            state,
            typespace: Typespace::new(),
            tables: HashMap::new(),
            ids_by_name: HashMap::new(),
            callbacks: HashMap::new(),
            pending: PendingCalls::new(),
            next_request_id: 0,
            stale: false,
        }
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true if the caches no longer track the server.
    ///
    /// Set when the connection drops; the cached rows remain readable but
    /// stop receiving deltas.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Number of reducer calls awaiting results.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Borrows the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrows the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Requests a subscription to the given queries.
    ///
    /// The server answers with a snapshot carrying the matching tables'
    /// descriptors and full row sets; until it arrives the connection is
    /// `Subscribing`.
    ///
    /// # Errors
    ///
    /// Fails if the connection is not in a state that accepts new
    /// subscriptions, or if the transport rejects the frame.
    pub fn subscribe(&mut self, queries: Vec<String>) -> ClientResult<u32> {
        if !self.state.can_subscribe() {
            return Err(ClientError::InvalidStateTransition {
                from: format!("{:?}", self.state),
                to: "Subscribing".into(),
            });
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.send_frame(&ClientFrame::Subscribe(Subscribe {
            request_id,
            queries,
        }))?;
        self.set_state(ConnectionState::Subscribing);
        Ok(request_id)
    }

    /// Drops previously subscribed queries.
    ///
    /// The server answers with a fresh snapshot of the remaining view.
    ///
    /// # Errors
    ///
    /// Fails unless the connection is `Subscribed`, or if the transport
    /// rejects the frame.
    pub fn unsubscribe(&mut self, query_ids: Vec<u32>) -> ClientResult<u32> {
        if self.state != ConnectionState::Subscribed {
            return Err(ClientError::InvalidStateTransition {
                from: format!("{:?}", self.state),
                to: "Subscribing".into(),
            });
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.send_frame(&ClientFrame::Unsubscribe(Unsubscribe {
            request_id,
            query_ids,
        }))?;
        self.set_state(ConnectionState::Subscribing);
        Ok(request_id)
    }

    /// Invokes a reducer on the server.
    ///
    /// Arguments are type checked against `params` before anything is sent.
    /// `on_result` resolves exactly once: with the server's outcome when the
    /// matching result frame has been applied (so a committed call observes
    /// its own changes in the caches), or with
    /// [`CallOutcome::ConnectionClosed`] if the connection drops first.
    ///
    /// # Errors
    ///
    /// Fails if the connection is closed, the arguments do not conform to
    /// `params`, or the transport rejects the frame. A rejected reducer is
    /// not an error; it arrives as [`CallOutcome::Failed`].
    pub fn call_reducer(
        &mut self,
        reducer: &str,
        params: &ProductType,
        args: ProductValue,
        on_result: impl FnOnce(CallOutcome) + 'static,
    ) -> ClientResult<CallToken> {
        if !self.state.is_active() {
            return Err(ClientError::ConnectionClosed);
        }
        let ty = AlgebraicType::Product(params.clone());
        let value = AlgebraicValue::Product(args);
        ty.check(&value, &self.typespace)?;
        let encoded = to_bsatn(&value);
        let token = self.pending.register(reducer, Box::new(on_result));
        self.send_frame(&ClientFrame::CallReducer(CallReducer {
            token: token.0,
            reducer: reducer.to_string(),
            args: encoded,
        }))?;
        debug!(token = token.0, reducer, "reducer call sent");
        Ok(token)
    }

    /// Processes the next pending server frame, if any.
    ///
    /// Returns `Ok(true)` when a frame was applied and `Ok(false)` when no
    /// frame was waiting. A `Connecting` connection whose transport has come
    /// up is promoted to `Connected` first.
    ///
    /// # Errors
    ///
    /// A transport failure closes the connection and fails all pending
    /// calls. A frame that fails to decode or apply is surfaced without
    /// closing the connection; later frames remain processable.
    pub fn advance(&mut self) -> ClientResult<bool> {
        if self.state == ConnectionState::Disconnected {
            return Err(ClientError::ConnectionClosed);
        }
        if self.state == ConnectionState::Connecting && self.transport.is_connected() {
            self.set_state(ConnectionState::Connected);
        }
        let bytes = match self.transport.recv() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(false),
            Err(err) => {
                self.handle_disconnect();
                return Err(err);
            }
        };
        match ServerFrame::decode(&bytes)? {
            ServerFrame::InitialSnapshot(snapshot) => self.apply_snapshot(snapshot)?,
            ServerFrame::TransactionUpdate(update) => self.apply_transaction(update)?,
        }
        Ok(true)
    }

    /// Processes pending frames until none remain or the drain budget is
    /// spent. Returns the number of frames applied.
    ///
    /// # Errors
    ///
    /// Stops at the first frame that fails, with the same semantics as
    /// [`advance`](Connection::advance).
    pub fn drain(&mut self) -> ClientResult<u32> {
        let mut processed = 0;
        while processed < self.config.drain_budget {
            if !self.advance()? {
                break;
            }
            processed += 1;
        }
        Ok(processed)
    }

    /// Closes the connection.
    ///
    /// Sends a best-effort disconnect frame, closes the transport, marks the
    /// caches stale, and fails all pending calls. Idempotent.
    pub fn close(&mut self) -> ClientResult<()> {
        if self.state == ConnectionState::Disconnected {
            return Ok(());
        }
        let _ = self.transport.send(&ClientFrame::Disconnect.encode());
        let _ = self.transport.close();
        self.handle_disconnect();
        Ok(())
    }

    /// Registers an insert observer for a table. The table does not need to
    /// be known yet; callbacks registered before the snapshot fire for its
    /// rows.
    pub fn on_insert(
        &mut self,
        table: &str,
        callback: impl FnMut(&EventContext, &ProductValue) + 'static,
    ) -> CallbackId {
        self.table_callbacks(table).on_insert(Box::new(callback))
    }

    /// Registers a delete observer for a table.
    pub fn on_delete(
        &mut self,
        table: &str,
        callback: impl FnMut(&EventContext, &ProductValue) + 'static,
    ) -> CallbackId {
        self.table_callbacks(table).on_delete(Box::new(callback))
    }

    /// Registers an update observer for a table. Only tables with a primary
    /// key produce updates.
    pub fn on_update(
        &mut self,
        table: &str,
        callback: impl FnMut(&EventContext, &ProductValue, &ProductValue) + 'static,
    ) -> CallbackId {
        self.table_callbacks(table).on_update(Box::new(callback))
    }

    /// Removes a previously registered callback.
    pub fn remove_callback(&mut self, table: &str, id: CallbackId) -> bool {
        self.callbacks
            .get_mut(table)
            .is_some_and(|callbacks| callbacks.remove(id))
    }

    /// The descriptor of a known table.
    pub fn table_def(&self, table: &str) -> Option<&TableDef> {
        let id = self.ids_by_name.get(table)?;
        self.tables.get(id).map(|entry| &entry.def)
    }

    /// Number of visible rows in a table; zero if the table is unknown.
    pub fn row_count(&self, table: &str) -> usize {
        self.table_entry(table).map_or(0, |entry| entry.cache.len())
    }

    /// A point-in-time copy of a table's visible rows, in no particular
    /// order.
    pub fn rows(&self, table: &str) -> Vec<ProductValue> {
        self.table_entry(table)
            .map_or_else(Vec::new, |entry| entry.cache.rows().cloned().collect())
    }

    /// Looks up a row by primary key. Returns `None` if the table is
    /// unknown, declares no primary key, or has no such row.
    pub fn find_by_key(&self, table: &str, key: &AlgebraicValue) -> Option<ProductValue> {
        let entry = self.table_entry(table)?;
        entry.def.primary_key_index()?;
        entry.cache.get(&to_bsatn(key)).cloned()
    }

    fn table_entry(&self, table: &str) -> Option<&TableEntry> {
        let id = self.ids_by_name.get(table)?;
        self.tables.get(id)
    }

    fn table_callbacks(&mut self, table: &str) -> &mut TableCallbacks {
        self.callbacks.entry(table.to_string()).or_default()
    }

    fn set_state(&mut self, next: ConnectionState) {
        debug!(from = ?self.state, to = ?next, "connection state change");
        self.state = next;
    }

    fn send_frame(&mut self, frame: &ClientFrame) -> ClientResult<()> {
        if let Err(err) = self.transport.send(&frame.encode()) {
            self.handle_disconnect();
            return Err(err);
        }
        Ok(())
    }

    fn handle_disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.set_state(ConnectionState::Disconnected);
        self.stale = true;
        let failed = self.pending.fail_all();
        if failed > 0 {
            debug!(failed, "failed pending calls on disconnect");
        }
    }

    /// Applies an initial snapshot: registers table descriptors and
    /// repopulates their caches wholesale.
    ///
    /// All tables are validated and all rows decoded before any connection
    /// state is touched, so a malformed snapshot changes nothing.
    fn apply_snapshot(&mut self, snapshot: InitialSnapshot) -> ClientResult<()> {
        debug!(
            request_id = snapshot.request_id,
            tables = snapshot.tables.len(),
            "applying snapshot"
        );
        struct StagedTable {
            table_id: u32,
            def: TableDef,
            row_type: AlgebraicType,
            rows: Vec<(Vec<u8>, ProductValue, Vec<u8>)>,
            visible: Vec<ProductValue>,
        }
        let mut staged = Vec::with_capacity(snapshot.tables.len());
        for table in snapshot.tables {
            table.table.validate()?;
            let row_type = AlgebraicType::Product(table.table.row_type());
            let mut rows = Vec::with_capacity(table.rows.len());
            // A row delivered more than once only fires its observer once.
            let mut seen: std::collections::HashSet<Vec<u8>> = std::collections::HashSet::new();
            let mut visible = Vec::with_capacity(table.rows.len());
            for bsatn in table.rows {
                let row = decode_row(&row_type, &self.typespace, &bsatn)?;
                let key = row_key(&table.table, &row, &bsatn);
                if seen.insert(key.clone()) {
                    visible.push(row.clone());
                } else {
                    warn!(table = %table.table.name, "duplicate row in snapshot; reference count bumped");
                }
                rows.push((key, row, bsatn));
            }
            staged.push(StagedTable {
                table_id: table.table_id,
                def: table.table,
                row_type,
                rows,
                visible,
            });
        }

        let mut dispatch: Vec<(String, Vec<ProductValue>)> = Vec::with_capacity(staged.len());
        for table in staged {
            let mut cache = TableCache::new();
            cache.replace_all(table.rows);
            self.ids_by_name.insert(table.def.name.clone(), table.table_id);
            dispatch.push((table.def.name.clone(), table.visible));
            self.tables.insert(
                table.table_id,
                TableEntry {
                    def: table.def,
                    row_type: table.row_type,
                    cache,
                },
            );
        }
        if self.state == ConnectionState::Subscribing {
            self.set_state(ConnectionState::Subscribed);
        } else {
            warn!(state = ?self.state, "snapshot arrived outside an active subscribe");
        }
        self.stale = false;

        // Snapshot rows fire insert observers with event id zero.
        let ctx = EventContext {
            event_id: 0,
            reducer: None,
        };
        for (name, rows) in dispatch {
            if let Some(callbacks) = self.callbacks.get_mut(&name) {
                for row in &rows {
                    callbacks.dispatch_insert(&ctx, row);
                }
            }
        }
        Ok(())
    }

    /// Applies one event's deltas, then dispatches row observers, then
    /// resolves the event's reducer call if it was ours.
    ///
    /// The whole frame is decoded before any cache is touched: an event
    /// either applies in full or leaves every cache as it was.
    fn apply_transaction(&mut self, update: TransactionUpdate) -> ClientResult<()> {
        let ctx = EventContext {
            event_id: update.event_id,
            reducer: update.call_result.as_ref().map(|r| r.reducer.clone()),
        };

        struct StagedDelta {
            table_id: u32,
            table: String,
            inserts: Vec<(Vec<u8>, ProductValue, Vec<u8>)>,
            updates: Vec<(Vec<u8>, ProductValue, Vec<u8>)>,
            deletes: Vec<Vec<u8>>,
        }
        let mut staged: Vec<StagedDelta> = Vec::with_capacity(update.deltas.len());
        for delta in update.deltas {
            let entry = self
                .tables
                .get(&delta.table_id)
                .ok_or(ClientError::UnknownTable {
                    table_id: delta.table_id,
                })?;

            let mut decoded_inserts = Vec::with_capacity(delta.inserts.len());
            for bsatn in delta.inserts {
                let row = decode_row(&entry.row_type, &self.typespace, &bsatn)?;
                let key = row_key(&entry.def, &row, &bsatn);
                decoded_inserts.push((key, row, bsatn));
            }
            let mut delete_slots: Vec<Option<Vec<u8>>> = Vec::with_capacity(delta.deletes.len());
            for bsatn in delta.deletes {
                let row = decode_row(&entry.row_type, &self.typespace, &bsatn)?;
                delete_slots.push(Some(row_key(&entry.def, &row, &bsatn)));
            }

            // A delete and an insert sharing a primary key within one event
            // form an update.
            let has_pk = entry.def.primary_key_index().is_some();
            let mut inserts = Vec::new();
            let mut updates = Vec::new();
            for (key, row, bsatn) in decoded_inserts {
                let paired = has_pk
                    .then(|| {
                        delete_slots
                            .iter()
                            .position(|slot| slot.as_deref() == Some(key.as_slice()))
                    })
                    .flatten();
                match paired {
                    Some(pos) => {
                        delete_slots[pos] = None;
                        updates.push((key, row, bsatn));
                    }
                    None => inserts.push((key, row, bsatn)),
                }
            }
            staged.push(StagedDelta {
                table_id: delta.table_id,
                table: entry.def.name.clone(),
                inserts,
                updates,
                deletes: delete_slots.into_iter().flatten().collect(),
            });
        }

        // Every row decoded; the caches take the event's post-state now.
        let mut changes: Vec<TableChanges> = Vec::with_capacity(staged.len());
        for delta in staged {
            let Some(entry) = self.tables.get_mut(&delta.table_id) else {
                continue;
            };
            let mut tc = TableChanges {
                table: delta.table,
                inserts: Vec::new(),
                deletes: Vec::new(),
                updates: Vec::new(),
            };

            // Deletes apply before inserts within one event.
            for key in delta.deletes {
                match entry.cache.delete(&key) {
                    DeleteOutcome::Removed(old) => tc.deletes.push(old),
                    DeleteOutcome::Retained => {}
                    DeleteOutcome::Missing => {
                        warn!(table = %tc.table, "delete for a row that is not cached");
                    }
                }
            }
            for (key, row, bsatn) in delta.updates {
                match entry.cache.update(&key, row.clone(), bsatn.clone()) {
                    Some(old) => tc.updates.push((old, row)),
                    None => {
                        warn!(table = %tc.table, "update for a row that is not cached");
                        if entry.cache.insert(key, row.clone(), bsatn) == InsertOutcome::Added {
                            tc.inserts.push(row);
                        }
                    }
                }
            }
            for (key, row, bsatn) in delta.inserts {
                match entry.cache.insert(key, row.clone(), bsatn) {
                    InsertOutcome::Added => tc.inserts.push(row),
                    InsertOutcome::Duplicate => {
                        warn!(table = %tc.table, "duplicate insert; reference count bumped");
                    }
                }
            }
            changes.push(tc);
        }

        // All caches now hold the event's post-state; observers run next.
        for tc in changes {
            let Some(callbacks) = self.callbacks.get_mut(&tc.table) else {
                continue;
            };
            for row in &tc.inserts {
                callbacks.dispatch_insert(&ctx, row);
            }
            for (old, new) in &tc.updates {
                callbacks.dispatch_update(&ctx, old, new);
            }
            for row in &tc.deletes {
                callbacks.dispatch_delete(&ctx, row);
            }
        }

        if let Some(result) = update.call_result {
            let outcome = match result.status {
                CallStatus::Committed => CallOutcome::Committed,
                CallStatus::Failed(message) => CallOutcome::Failed(message),
            };
            match self.pending.resolve(result.token, outcome) {
                Some(reducer) => {
                    debug!(token = result.token, reducer = %reducer, "reducer call resolved");
                }
                None => warn!(token = result.token, "call result for an unknown token"),
            }
        }
        Ok(())
    }
}

fn decode_row(
    row_type: &AlgebraicType,
    typespace: &Typespace,
    bsatn: &[u8],
) -> ClientResult<ProductValue> {
    match from_bsatn(row_type, typespace, bsatn)? {
        AlgebraicValue::Product(row) => Ok(row),
        other => Err(CodecError::type_mismatch("", "product row", other.kind()).into()),
    }
}
