//! kosmo-hw-interface
//!
//! Control-module firmware for the Raspberry Pi Pico 2. Runs the two
//! library crates side by side:
//!
//! 1. The pots task scans eight pots behind a 4051 multiplexer with the
//!    on-chip ADC and pushes every stable, significant change into a queue.
//! 2. The pot report task drains that queue and logs the changes.
//! 3. The comm task answers the parent controller on I2C1 as a responder,
//!    feeding each controller write and read into the shared
//!    `BusRegisterPeer`.
//! 4. The part task picks up register sets committed by the controller.
//!
//! The scanner and the peer never talk to each other.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::i2c;
use embassy_rp::i2c_slave::{self, Command, I2cSlave};
use embassy_rp::peripherals::I2C1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use kosmo_comm::comm_peer::{BusRegisterPeer, FrameTransport, DEFAULT_ADDRESS};
use mux_scanner::{scan_task, AnalogSource, ChannelChange, MuxScanner, ScannerConfig};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// Wire the I2C1 peripheral interrupt to Embassy's async handler.
bind_interrupts!(struct Irqs {
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Register block shared with the parent controller.
static PEER: BusRegisterPeer = BusRegisterPeer::new();

/// Pot changes, written by the pots task and read by the report task.
static POT_CHANGES: StaticCell<Channel<CriticalSectionRawMutex, ChannelChange, POT_QUEUE_LEN>> =
    StaticCell::new();

// ---------------------------------------------------------------------------
// Types and constants
// ---------------------------------------------------------------------------

/// Pots wired to the 4051 inputs.
const POT_COUNT: usize = 8;

/// Pending pot changes before the scanner starts dropping them.
const POT_QUEUE_LEN: usize = 16;

/// Largest controller write: a register set plus a trailing command.
const RX_BUFFER_LEN: usize = 32;

type PotScanner = MuxScanner<Output<'static>, PotSource<'static>, POT_COUNT>;

/// The 4051's common pin, read through the RP2350's 12-bit ADC.
struct PotSource<'d> {
    adc: Adc<'d, adc::Blocking>,
    pin: adc::Channel<'d>,
}

impl AnalogSource for PotSource<'_> {
    type Error = adc::Error;
    const FULL_SCALE: u16 = 4095;

    fn read_raw(&mut self) -> Result<u16, adc::Error> {
        self.adc.blocking_read(&mut self.pin)
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Thin wrapper that monomorphises the generic `scan_task` so it can be
/// spawned as a concrete Embassy task.
#[embassy_executor::task]
async fn pots_task(
    scanner: PotScanner,
    changes: Sender<'static, CriticalSectionRawMutex, ChannelChange, POT_QUEUE_LEN>,
) {
    scan_task(scanner, Duration::from_millis(1), changes).await;
}

/// Logs every pot change reported by the scanner.
#[embassy_executor::task]
async fn pot_report_task(
    changes: Receiver<'static, CriticalSectionRawMutex, ChannelChange, POT_QUEUE_LEN>,
) {
    loop {
        let change = changes.receive().await;
        info!("Pot {}: {}", change.channel, change.value);
    }
}

/// I2C responder loop.
///
/// Each controller write is wrapped in a `FrameTransport` and handed to
/// `on_data_received`; each controller read collects the response from
/// `on_read_requested` and sends it. The peer's state is only locked inside
/// those calls — never across an I2C transfer.
#[embassy_executor::task]
async fn comm_task(mut bus: I2cSlave<'static, I2C1>) {
    info!("Comm task started");
    let mut rx = [0u8; RX_BUFFER_LEN];

    loop {
        let command = match bus.listen(&mut rx).await {
            Ok(command) => command,
            Err(e) => {
                warn!("I2C listen failed: {}", e);
                continue;
            }
        };

        match command {
            Command::Write(len) => {
                let mut transport = FrameTransport::received(&rx[..len]);
                PEER.on_data_received(&mut transport, len);
            }
            Command::WriteRead(len) => {
                let mut transport = FrameTransport::received(&rx[..len]);
                PEER.on_data_received(&mut transport, len);
                respond(&mut bus).await;
            }
            Command::Read => respond(&mut bus).await,
            Command::GeneralCall(len) => debug!("Ignoring general call ({} bytes)", len),
        }
    }
}

/// Answer one controller read from the peer.
async fn respond(bus: &mut I2cSlave<'static, I2C1>) {
    let mut transport = FrameTransport::default();
    PEER.on_read_requested(&mut transport);

    // Pad with zeros if the controller clocks out more than we have.
    if let Err(e) = bus.respond_and_fill(transport.response(), 0x00).await {
        warn!("I2C response failed: {}", e);
    }
}

/// Picks up register sets committed by the controller.
#[embassy_executor::task]
async fn part_task() {
    loop {
        Timer::after(Duration::from_millis(10)).await;

        if let Some(registers) = PEER.take_committed() {
            info!(
                "New part: bank {}, mix {}",
                registers.bank, registers.mix
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("kosmo-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // MUX_S0  → GP10  (p.PIN_10)
    // MUX_S1  → GP11  (p.PIN_11)
    // MUX_S2  → GP12  (p.PIN_12)
    // MUX_COM → GP26  (p.PIN_26)  ADC0
    // I2C_SDA → GP2   (p.PIN_2)   I2C1, responder
    // I2C_SCL → GP3   (p.PIN_3)
    // ———————————————————————————————————————————————————————————————————————

    // —— Pot scanner ————————————————————————————————————————————————————————

    let select = [
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
    ];
    let pots = PotSource {
        adc: Adc::new_blocking(p.ADC, adc::Config::default()),
        pin: adc::Channel::new_pin(p.PIN_26, Pull::None),
    };

    // 12-bit readings: four times the 10-bit hysteresis, averaged over four
    // samples to settle the mux after switching.
    let config = ScannerConfig {
        scan_interval_ms: 5,
        hysteresis: 12,
        samples_per_read: 4,
    };
    let scanner: PotScanner = MuxScanner::with_config(select, pots, config);

    let pot_changes: &'static Channel<_, _, POT_QUEUE_LEN> = POT_CHANGES.init(Channel::new());

    // —— I2C responder ——————————————————————————————————————————————————————

    let mut bus_config = i2c_slave::Config::default();
    bus_config.addr = u16::from(DEFAULT_ADDRESS);
    // The controller drives the clock; a responder cannot pick 400 kHz.
    let bus = I2cSlave::new(p.I2C1, p.PIN_3, p.PIN_2, Irqs, bus_config);
    info!("Comm peer listening at address {}", DEFAULT_ADDRESS);

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(pots_task(scanner, pot_changes.sender())).unwrap();
    spawner.spawn(pot_report_task(pot_changes.receiver())).unwrap();
    spawner.spawn(comm_task(bus)).unwrap();
    spawner.spawn(part_task()).unwrap();

    info!("All tasks spawned");
}
