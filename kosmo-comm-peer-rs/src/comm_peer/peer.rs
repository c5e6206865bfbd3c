use core::cell::RefCell;

use critical_section::Mutex;

use super::register_set::{RegisterSet, REGISTER_SET_LEN};
use super::transaction::{Command, CommandToken, TransactionState};
use super::transport::{BusTransport, RESPONSE_LEN};
use super::{BUS_CLOCK_HZ, DEFAULT_ADDRESS, STATUS_NOT_READY, STATUS_READY};

/// Everything the interrupt handlers share, guarded as one unit.
struct PeerState {
    /// Served to `"get"` reads. Only replaced whole.
    active: RegisterSet,
    /// Assembled by a `"set"` transaction, copied to `active` on `"endset"`.
    staging: RegisterSet,
    state: TransactionState,
    token: CommandToken,
    /// Raised by every commit, cleared by `take_committed`.
    committed: bool,
}

impl PeerState {
    const fn new() -> Self {
        Self {
            active: RegisterSet::new(),
            staging: RegisterSet::new(),
            state: TransactionState::Idle,
            token: CommandToken::new(),
            committed: false,
        }
    }

    fn receive<T: BusTransport>(&mut self, transport: &mut T, _byte_count: usize) {
        if self.state == TransactionState::Setting && self.token.is(b"set") {
            self.receive_payload(transport);
        }

        self.token.clear();
        while let Some(byte) = transport.read() {
            self.token.push(byte);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "controller write: {} bytes, command {}",
            _byte_count,
            self.token
        );

        match self.token.command() {
            Command::Program => {
                self.state = TransactionState::ProgrammingOpen;
                #[cfg(feature = "defmt")]
                defmt::info!("programming started");
            }
            Command::End => {
                self.state = TransactionState::Idle;
                #[cfg(feature = "defmt")]
                defmt::info!("programming ended");
            }
            Command::Set => {
                self.token.normalize_set();
                self.state = TransactionState::Setting;
                #[cfg(feature = "defmt")]
                defmt::debug!("set started");
            }
            Command::EndSet => {
                self.active = self.staging;
                self.committed = true;
                self.state = TransactionState::Idle;
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "set committed: bank {}, mix {}",
                    self.active.bank,
                    self.active.mix
                );
            }
            Command::Other => {}
        }
    }

    /// Read one register set into `staging`.
    ///
    /// A short payload leaves `staging` as it was.
    fn receive_payload<T: BusTransport>(&mut self, transport: &mut T) {
        let mut payload = [0u8; REGISTER_SET_LEN];
        let count = transport.read_bytes(&mut payload);

        match RegisterSet::from_bytes(&payload[..count]) {
            Ok(set) => {
                self.staging = set;
                #[cfg(feature = "defmt")]
                defmt::debug!("staged bank {}, mix {}", set.bank, set.mix);
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("register payload dropped: {}", _e);
            }
        }
    }
}

/// Responder side of the sampler's programming protocol.
///
/// Holds two [`RegisterSet`]s: the *active* one that the controller reads
/// back, and a *staging* one filled by a `"set"` transaction. Only a
/// completed `"set"` → payload → `"endset"` sequence replaces the active set,
/// and it does so in one step, so a read never observes a half-written set.
///
/// All methods take `&self`; state is guarded by a
/// [`critical_section::Mutex`], which makes the peer safe to share between
/// the transport's interrupt handlers and the main loop.
///
/// # Example
///
/// ```ignore
/// use kosmo_comm::comm_peer::BusRegisterPeer;
///
/// static PEER: BusRegisterPeer = BusRegisterPeer::new();
///
/// // In the transport's receive interrupt:
/// PEER.on_data_received(&mut bus, byte_count);
///
/// // In the transport's request interrupt:
/// PEER.on_read_requested(&mut bus);
///
/// // In the main loop:
/// if let Some(registers) = PEER.take_committed() {
///     apply(registers);
/// }
/// ```
pub struct BusRegisterPeer {
    inner: Mutex<RefCell<PeerState>>,
}

impl Default for BusRegisterPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl BusRegisterPeer {
    /// A peer in [`TransactionState::Idle`] with all-zero register sets.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(PeerState::new())),
        }
    }

    /// Join the bus at [`DEFAULT_ADDRESS`] with a [`BUS_CLOCK_HZ`] clock.
    ///
    /// The caller routes the transport's receive and request interrupts to
    /// [`on_data_received`](Self::on_data_received) and
    /// [`on_read_requested`](Self::on_read_requested).
    pub fn attach<T: BusTransport>(&self, transport: &mut T) {
        transport.begin(DEFAULT_ADDRESS);
        transport.set_clock(BUS_CLOCK_HZ);

        #[cfg(feature = "defmt")]
        defmt::info!("comm peer ready at address {}", DEFAULT_ADDRESS);
    }

    // ── Transport events ─────────────────────────────────────────────

    /// Handle a controller write of `byte_count` bytes.
    ///
    /// 1. In [`TransactionState::Setting`] with command `"set"`, the first
    ///    [`REGISTER_SET_LEN`] bytes are a register set for *staging*.
    /// 2. All remaining bytes become the new command token, replacing the
    ///    previous one.
    /// 3. The token is dispatched: `"prg"`, `"end"`, `"set..."` (normalized
    ///    to `"set"`) and `"endset"` (commit) change state; any other token
    ///    is kept as the current command for the read path.
    pub fn on_data_received<T: BusTransport>(&self, transport: &mut T, byte_count: usize) {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .receive(transport, byte_count);
        });
    }

    /// Handle a controller read.
    ///
    /// Responds `[1, <active set>]` when the current command is `"get"`,
    /// `[0]` otherwise. The active set is copied under the lock, so the
    /// response is a consistent snapshot.
    pub fn on_read_requested<T: BusTransport>(&self, transport: &mut T) {
        let snapshot = critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            inner.token.is(b"get").then_some(inner.active)
        });

        match snapshot {
            Some(active) => {
                let mut response = [0u8; RESPONSE_LEN];
                response[0] = STATUS_READY;
                response[1..].copy_from_slice(&active.to_bytes());
                transport.write(&response);
            }
            None => {
                transport.write(&[STATUS_NOT_READY]);
            }
        }
    }

    // ── Application access ───────────────────────────────────────────

    /// Returns the set committed since the last call, if any.
    ///
    /// Several commits in between collapse into the latest one.
    pub fn take_committed(&self) -> Option<RegisterSet> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            core::mem::take(&mut inner.committed).then_some(inner.active)
        })
    }

    /// Publish a locally changed register set to the read path.
    ///
    /// Does not touch *staging* or the transaction state, and does not
    /// raise the commit flag.
    pub fn set_active(&self, registers: RegisterSet) {
        critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).active = registers;
        });
    }

    /// Snapshot of the active register set.
    pub fn active(&self) -> RegisterSet {
        critical_section::with(|cs| self.inner.borrow_ref(cs).active)
    }

    /// Snapshot of the staging register set.
    pub fn staging(&self) -> RegisterSet {
        critical_section::with(|cs| self.inner.borrow_ref(cs).staging)
    }

    /// Current transaction state.
    pub fn state(&self) -> TransactionState {
        critical_section::with(|cs| self.inner.borrow_ref(cs).state)
    }

    /// Returns `true` if the current command token is exactly `command`.
    pub fn command_is(&self, command: &[u8]) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).token.is(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm_peer::FrameTransport;

    const PART: RegisterSet = RegisterSet {
        bank: 3,
        mix: [100, 200, 300, 400, 1023],
    };

    // Helper: deliver one controller write.
    fn write(peer: &BusRegisterPeer, bytes: &[u8]) {
        let mut transport = FrameTransport::received(bytes);
        peer.on_data_received(&mut transport, bytes.len());
    }

    // Helper: perform one controller read and return the response.
    fn read(peer: &BusRegisterPeer) -> heapless::Vec<u8, RESPONSE_LEN> {
        let mut transport = FrameTransport::default();
        peer.on_read_requested(&mut transport);
        heapless::Vec::from_slice(transport.response()).unwrap()
    }

    fn ready_response(set: &RegisterSet) -> [u8; RESPONSE_LEN] {
        let mut response = [STATUS_READY; RESPONSE_LEN];
        response[1..].copy_from_slice(&set.to_bytes());
        response
    }

    fn program(peer: &BusRegisterPeer, set: &RegisterSet) {
        write(peer, b"set");
        write(peer, &set.to_bytes());
        write(peer, b"endset");
    }

    // ── Default state ────────────────────────────────────────────────

    #[test]
    fn default_state() {
        let peer = BusRegisterPeer::new();
        assert_eq!(peer.state(), TransactionState::Idle);
        assert_eq!(peer.active(), RegisterSet::new());
        assert_eq!(peer.staging(), RegisterSet::new());
        assert!(peer.command_is(b""));
        assert_eq!(peer.take_committed(), None);
    }

    #[test]
    fn attach_joins_at_default_address_and_clock() {
        let peer = BusRegisterPeer::new();
        let mut transport = FrameTransport::default();

        peer.attach(&mut transport);

        assert_eq!(transport.address(), Some(DEFAULT_ADDRESS));
        assert_eq!(transport.clock_hz(), Some(BUS_CLOCK_HZ));
    }

    // ── Read path ────────────────────────────────────────────────────

    #[test]
    fn read_without_get_returns_not_ready() {
        let peer = BusRegisterPeer::new();
        assert_eq!(read(&peer), [STATUS_NOT_READY]);

        write(&peer, b"prg");
        assert_eq!(read(&peer), [STATUS_NOT_READY]);

        write(&peer, b"getx");
        assert_eq!(read(&peer), [STATUS_NOT_READY]);
    }

    #[test]
    fn get_returns_active_set() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"get");

        assert_eq!(read(&peer), ready_response(&RegisterSet::new()));
        // The command stays armed for repeated reads.
        assert_eq!(read(&peer), ready_response(&RegisterSet::new()));
    }

    #[test]
    fn get_is_a_plain_command() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"prg");
        write(&peer, b"get");

        assert_eq!(peer.state(), TransactionState::ProgrammingOpen);
    }

    // ── Programming session ──────────────────────────────────────────

    #[test]
    fn prg_then_end_returns_to_idle_without_touching_active() {
        let peer = BusRegisterPeer::new();
        program(&peer, &PART);
        peer.take_committed();

        write(&peer, b"prg");
        assert_eq!(peer.state(), TransactionState::ProgrammingOpen);

        write(&peer, b"end");
        assert_eq!(peer.state(), TransactionState::Idle);
        assert_eq!(peer.active(), PART);
        assert_eq!(peer.take_committed(), None);
    }

    // ── Set transaction ──────────────────────────────────────────────

    #[test]
    fn set_payload_endset_commits() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"prg");
        program(&peer, &PART);
        write(&peer, b"end");

        write(&peer, b"get");
        assert_eq!(read(&peer), ready_response(&PART));
        assert_eq!(peer.state(), TransactionState::Idle);
    }

    #[test]
    fn payload_without_endset_keeps_previous_active() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"set");
        write(&peer, &PART.to_bytes());

        assert_eq!(peer.staging(), PART);
        assert_eq!(peer.state(), TransactionState::Setting);

        write(&peer, b"get");
        assert_eq!(read(&peer), ready_response(&RegisterSet::new()));
        assert_eq!(peer.take_committed(), None);
    }

    #[test]
    fn payload_and_endset_in_one_write() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"set");

        let mut frame = [0u8; REGISTER_SET_LEN + 6];
        frame[..REGISTER_SET_LEN].copy_from_slice(&PART.to_bytes());
        frame[REGISTER_SET_LEN..].copy_from_slice(b"endset");
        write(&peer, &frame);

        assert_eq!(peer.active(), PART);
        assert_eq!(peer.state(), TransactionState::Idle);
    }

    #[test]
    fn set_prefix_is_normalized() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"set:bank3");

        assert_eq!(peer.state(), TransactionState::Setting);
        assert!(peer.command_is(b"set"));

        write(&peer, &PART.to_bytes());
        assert_eq!(peer.staging(), PART);
    }

    #[test]
    fn payload_is_only_read_right_after_set() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"set");
        // Unknown command: still Setting, but the token is no longer "set".
        write(&peer, b"nop");
        assert_eq!(peer.state(), TransactionState::Setting);

        // These bytes are now a command, not a payload.
        write(&peer, &PART.to_bytes());
        assert_eq!(peer.staging(), RegisterSet::new());
    }

    #[test]
    fn short_payload_leaves_staging_unchanged() {
        let peer = BusRegisterPeer::new();
        program(&peer, &PART);

        write(&peer, b"set");
        write(&peer, &[9, 9, 9]);
        assert_eq!(peer.staging(), PART);

        write(&peer, b"endset");
        assert_eq!(peer.active(), PART);
    }

    #[test]
    fn endset_without_payload_recommits_staging() {
        let peer = BusRegisterPeer::new();
        program(&peer, &PART);
        peer.set_active(RegisterSet::new());

        write(&peer, b"endset");
        assert_eq!(peer.active(), PART);
    }

    #[test]
    fn second_transaction_replaces_whole_set() {
        let peer = BusRegisterPeer::new();
        program(&peer, &PART);

        let next = RegisterSet {
            bank: 9,
            mix: [1, 2, 3, 4, 5],
        };
        program(&peer, &next);

        write(&peer, b"get");
        assert_eq!(read(&peer), ready_response(&next));
    }

    // ── Commit notification ──────────────────────────────────────────

    #[test]
    fn take_committed_reports_each_commit_once() {
        let peer = BusRegisterPeer::new();
        program(&peer, &PART);

        assert_eq!(peer.take_committed(), Some(PART));
        assert_eq!(peer.take_committed(), None);
    }

    #[test]
    fn set_active_is_served_but_not_reported_as_commit() {
        let peer = BusRegisterPeer::new();
        peer.set_active(PART);

        write(&peer, b"get");
        assert_eq!(read(&peer), ready_response(&PART));
        assert_eq!(peer.take_committed(), None);
        assert_eq!(peer.staging(), RegisterSet::new());
    }

    // ── Token handling ───────────────────────────────────────────────

    #[test]
    fn each_write_replaces_the_command() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"get");
        write(&peer, b"");

        assert!(peer.command_is(b""));
        assert_eq!(read(&peer), [STATUS_NOT_READY]);
    }

    #[test]
    fn unknown_command_keeps_state() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"prg");
        write(&peer, b"hello");

        assert_eq!(peer.state(), TransactionState::ProgrammingOpen);
        assert!(peer.command_is(b"hello"));
    }

    #[test]
    fn overlong_write_is_truncated_to_token_capacity() {
        let peer = BusRegisterPeer::new();
        write(&peer, b"getgetgetgetgetgetgetget");

        assert!(!peer.command_is(b"get"));
        assert_eq!(read(&peer), [STATUS_NOT_READY]);
    }
}
