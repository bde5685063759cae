use crate::error::{Result, VsxError};
use crate::inputs::InputNames;
use crate::modes;
use crate::protocol::{self, ParsedLine};
use crate::subscription::VsxEvent;
use crate::types::{ConnectionStatus, Zone};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Settle time between the wake byte and the initial status-query burst.
const WAKE_DELAY: Duration = Duration::from_millis(100);

/// Spacing between staggered commands in a query burst. The device's serial
/// command buffer overruns if queries are written back to back.
const COMMAND_STAGGER: Duration = Duration::from_millis(100);

/// Event channel capacity before slow subscribers start lagging.
const EVENT_CAPACITY: usize = 100;

/// Mutable session state shared between the socket tasks and the client.
struct EngineState {
    status: ConnectionStatus,
    input_names: InputNames,
    /// Last reported input id per zone, for re-emitting `input` when a name
    /// report renames the selected input
    selected: HashMap<Zone, String>,
}

/// A write scheduled for a future instant. Ordered by deadline, then by
/// submission sequence so simultaneous deadlines drain in submission order.
struct ScheduledCommand {
    due: Instant,
    seq: u64,
    body: String,
}

impl PartialEq for ScheduledCommand {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledCommand {}

impl PartialOrd for ScheduledCommand {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledCommand {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// TCP session with the receiver.
///
/// Owns the socket and the tasks around it: a writer fed by a channel, a
/// reader that frames and dispatches inbound lines, a scheduler draining the
/// staggered-write queue, and a greeter that runs the wake sequence. Losing
/// the connection is terminal; dropping the session aborts every task, which
/// also cancels writes still sitting in the schedule queue.
pub(crate) struct Connection {
    state: Arc<Mutex<EngineState>>,
    cmd_tx: mpsc::UnboundedSender<String>,
    sched_tx: mpsc::UnboundedSender<ScheduledCommand>,
    event_tx: broadcast::Sender<VsxEvent>,
    seq: Arc<AtomicU64>,
    tasks: Vec<JoinHandle<()>>,
}

impl Connection {
    /// Open the control connection and start the session tasks.
    ///
    /// On success the wake byte is already written and the initial
    /// status-query burst is scheduled to go out after [`WAKE_DELAY`];
    /// subscribers see [`VsxEvent::Connect`] once the burst is issued.
    pub(crate) async fn open(host: &str, port: u16, log_level: u8) -> Result<Self> {
        tracing::info!("connecting to {}:{}", host, port);
        let stream = TcpStream::connect((host, port)).await?;
        // Control commands are tiny and latency-sensitive
        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("failed to set TCP_NODELAY: {}", e);
        }
        let (read_half, write_half) = stream.into_split();

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<String>();
        let (sched_tx, sched_rx) = mpsc::unbounded_channel::<ScheduledCommand>();
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let state = Arc::new(Mutex::new(EngineState {
            status: ConnectionStatus::Connected,
            input_names: InputNames::new(),
            selected: HashMap::new(),
        }));
        let seq = Arc::new(AtomicU64::new(0));

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(write_loop(
            write_half,
            cmd_rx,
            state.clone(),
            event_tx.clone(),
        )));
        tasks.push(tokio::spawn(read_loop(
            read_half,
            Dispatcher {
                state: state.clone(),
                cmd_tx: cmd_tx.clone(),
                event_tx: event_tx.clone(),
                log_level,
            },
        )));
        tasks.push(tokio::spawn(schedule_loop(sched_rx, cmd_tx.clone())));

        // Wake sequence: a bare CR prompts the device into accepting
        // commands, then the initial queries go out after a settle delay.
        cmd_tx
            .send(String::new())
            .map_err(|_| VsxError::ConnectionClosed)?;
        {
            let state = state.clone();
            let sched_tx = sched_tx.clone();
            let seq = seq.clone();
            let event_tx = event_tx.clone();
            tasks.push(tokio::spawn(async move {
                tokio::time::sleep(WAKE_DELAY).await;
                schedule_status_queries(&state, &sched_tx, &seq);
                let _ = event_tx.send(VsxEvent::Connect);
            }));
        }

        Ok(Self {
            state,
            cmd_tx,
            sched_tx,
            event_tx,
            seq,
            tasks,
        })
    }

    /// Enqueue one command body for immediate write.
    pub(crate) fn send(&self, body: impl Into<String>) -> Result<()> {
        if self.status().is_terminal() {
            return Err(VsxError::ConnectionClosed);
        }
        self.cmd_tx
            .send(body.into())
            .map_err(|_| VsxError::ConnectionClosed)
    }

    /// Schedule the full status-query burst; returns its total span.
    pub(crate) fn query(&self) -> Duration {
        schedule_status_queries(&self.state, &self.sched_tx, &self.seq)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<VsxEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        self.state.lock().unwrap().status
    }

    pub(crate) fn input_name(&self, id: &str) -> Option<String> {
        self.state.lock().unwrap().input_names.resolve(id)
    }

    pub(crate) fn input_names(&self) -> std::collections::BTreeMap<String, String> {
        self.state.lock().unwrap().input_names.snapshot()
    }

    pub(crate) fn selected_input(&self, zone: Zone) -> Option<String> {
        self.state.lock().unwrap().selected.get(&zone).cloned()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Tears down the socket tasks and cancels scheduled writes that
        // have not reached the wire yet.
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Queue every status query, each due one stagger interval after the
/// previous, and return the burst's total span. Overlapping bursts share
/// the schedule queue and interleave by deadline.
fn schedule_status_queries(
    state: &Arc<Mutex<EngineState>>,
    sched_tx: &mpsc::UnboundedSender<ScheduledCommand>,
    seq: &Arc<AtomicU64>,
) -> Duration {
    let ids = state.lock().unwrap().input_names.ids();
    let commands = protocol::status_queries(&ids);
    let count = commands.len() as u32;
    let now = Instant::now();
    for (i, body) in commands.into_iter().enumerate() {
        let command = ScheduledCommand {
            due: now + COMMAND_STAGGER * (i as u32 + 1),
            seq: seq.fetch_add(1, Ordering::Relaxed),
            body,
        };
        if sched_tx.send(command).is_err() {
            break;
        }
    }
    COMMAND_STAGGER * (count + 1)
}

/// Forward command bodies to the socket, appending the CR terminator.
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut cmd_rx: mpsc::UnboundedReceiver<String>,
    state: Arc<Mutex<EngineState>>,
    event_tx: broadcast::Sender<VsxEvent>,
) {
    while let Some(body) = cmd_rx.recv().await {
        tracing::debug!("sending: {:?}", body);
        let wire = format!("{}\r", body);
        if let Err(e) = write_half.write_all(wire.as_bytes()).await {
            tracing::error!("failed to write command: {}", e);
            mark_terminal(
                &state,
                &event_tx,
                ConnectionStatus::Errored,
                VsxEvent::Error {
                    message: e.to_string(),
                },
            );
            break;
        }
    }
}

/// Frame the inbound stream into CR LF terminated lines and dispatch each.
async fn read_loop(read_half: OwnedReadHalf, dispatcher: Dispatcher) {
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::info!("connection ended by peer");
                dispatcher.finish(ConnectionStatus::Ended, VsxEvent::End);
                break;
            }
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(['\r', '\n']);
                if !line.is_empty() {
                    dispatcher.dispatch(line);
                }
            }
            Err(e) => {
                tracing::error!("read error: {}", e);
                dispatcher.finish(
                    ConnectionStatus::Errored,
                    VsxEvent::Error {
                        message: e.to_string(),
                    },
                );
                break;
            }
        }
    }
}

/// Drain the deadline-ordered schedule queue into the writer.
async fn schedule_loop(
    mut sched_rx: mpsc::UnboundedReceiver<ScheduledCommand>,
    cmd_tx: mpsc::UnboundedSender<String>,
) {
    let mut queue: BinaryHeap<Reverse<ScheduledCommand>> = BinaryHeap::new();
    loop {
        let next_due = queue.peek().map(|entry| entry.0.due);
        tokio::select! {
            incoming = sched_rx.recv() => match incoming {
                Some(command) => queue.push(Reverse(command)),
                // Session dropped; whatever is still queued never goes out
                None => break,
            },
            _ = sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                if let Some(Reverse(command)) = queue.pop() {
                    if cmd_tx.send(command.body).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Applies the side effects of classified inbound lines: event emission,
/// name-table updates, selected-input tracking, and follow-up queries.
struct Dispatcher {
    state: Arc<Mutex<EngineState>>,
    cmd_tx: mpsc::UnboundedSender<String>,
    event_tx: broadcast::Sender<VsxEvent>,
    log_level: u8,
}

impl Dispatcher {
    fn dispatch(&self, line: &str) {
        match protocol::parse_line(line) {
            ParsedLine::Power { zone, on } => {
                if self.log_level >= 1 {
                    tracing::debug!("got {} power: {}", zone, if on { "ON" } else { "OFF" });
                }
                self.emit(VsxEvent::Power { on, zone });
            }
            ParsedLine::Volume { zone, db } => {
                if self.log_level >= 1 {
                    tracing::debug!("got {} volume: {} dB", zone, db);
                }
                self.emit(VsxEvent::Volume { db, zone });
            }
            ParsedLine::Mute { zone, on } => {
                if self.log_level >= 1 {
                    tracing::debug!("got {} mute: {}", zone, if on { "ON" } else { "OFF" });
                }
                self.emit(VsxEvent::Mute { on, zone });
            }
            ParsedLine::Input { zone, id } => {
                let name = {
                    let mut state = self.state.lock().unwrap();
                    state.selected.insert(zone, id.clone());
                    state.input_names.resolve(&id)
                };
                if self.log_level >= 1 {
                    tracing::debug!(
                        "got {} input: {} ({})",
                        zone,
                        id,
                        name.as_deref().unwrap_or("???")
                    );
                }
                self.emit(VsxEvent::Input { id, name, zone });
            }
            ParsedLine::ListeningModeSet { mode } => {
                // The SR report mirrors the remote key press, not the mode
                // the DSP settled on; ask for the display mode right away.
                tracing::debug!(
                    "listening mode set: {} ({})",
                    mode,
                    modes::set_mode_name(&mode).unwrap_or("???")
                );
                let _ = self.cmd_tx.send(protocol::DISPLAY_MODE_QUERY.to_string());
                self.emit(VsxEvent::ListeningModeSet { mode });
            }
            ParsedLine::ListeningModeDisplay { mode } => {
                tracing::debug!(
                    "playing listening mode: {} ({})",
                    mode,
                    modes::display_mode_name(&mode).unwrap_or("???")
                );
                self.emit(VsxEvent::ListeningModeDisplay { mode });
            }
            ParsedLine::InputName { id, name } => {
                let (changed, reselected) = {
                    let mut state = self.state.lock().unwrap();
                    let changed = state.input_names.update(&id, &name);
                    let zones: Vec<Zone> = state
                        .selected
                        .iter()
                        .filter(|&(_, selected_id)| *selected_id == id)
                        .map(|(&zone, _)| zone)
                        .collect();
                    (changed, zones)
                };
                if changed && self.log_level >= 2 {
                    tracing::debug!("got new name for input {}: {:?}", id, name);
                }
                self.emit(VsxEvent::InputName {
                    id: id.clone(),
                    name: name.clone(),
                });
                // Refresh the input event for any zone currently on this id
                // so subscribers need not re-derive the name themselves.
                for zone in reselected {
                    self.emit(VsxEvent::Input {
                        id: id.clone(),
                        name: Some(name.clone()),
                        zone,
                    });
                }
            }
            ParsedLine::Acknowledged { prefix } => {
                if self.log_level >= 2 {
                    tracing::debug!("got {}: {}", prefix, line);
                }
            }
            ParsedLine::Unclassified => {
                if self.log_level >= 1 {
                    tracing::debug!("unclassified line: {:?}", line);
                }
            }
        }
    }

    fn emit(&self, event: VsxEvent) {
        let _ = self.event_tx.send(event);
    }

    fn finish(&self, status: ConnectionStatus, event: VsxEvent) {
        mark_terminal(&self.state, &self.event_tx, status, event);
    }
}

/// Move the session into a terminal state exactly once; later failures on
/// the other socket half are not re-reported.
fn mark_terminal(
    state: &Arc<Mutex<EngineState>>,
    event_tx: &broadcast::Sender<VsxEvent>,
    status: ConnectionStatus,
    event: VsxEvent,
) {
    {
        let mut state = state.lock().unwrap();
        if state.status.is_terminal() {
            return;
        }
        state.status = status;
    }
    let _ = event_tx.send(event);
}
