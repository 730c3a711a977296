#![allow(dead_code)]

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use simple_ads1246::bus::{Clock, HalBus};
use simple_ads1246::{Ads1246, DriverConfig};

pub type TestAds1246 = Ads1246<HalBus<SpiMock<u8>, FakeClock>, PinMock, PinMock, RecordingDelay>;

/// Clock that moves forward by `step` every time it is read.
pub struct FakeClock {
    now: Cell<Duration>,
    step: Duration,
}

impl FakeClock {
    pub fn frozen() -> Self {
        Self::stepping(Duration::ZERO)
    }

    pub fn stepping(step: Duration) -> Self {
        FakeClock {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

/// Delay that only adds up how long it was asked to wait.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    total_ns: Rc<Cell<u64>>,
}

impl RecordingDelay {
    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns.get())
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }
}

/// Console capturing everything written to it.
#[derive(Default)]
pub struct Capture(pub Vec<u8>);

impl Capture {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl embedded_io::ErrorType for Capture {
    type Error = Infallible;
}

impl embedded_io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Chip select expectations for `transactions` framed bus transactions,
/// after the initial high level set by the constructor.
pub fn cs_frames(transactions: usize) -> Vec<PinTransaction> {
    let mut expected = vec![PinTransaction::set(State::High)];
    for _ in 0..transactions {
        expected.push(PinTransaction::set(State::Low));
        expected.push(PinTransaction::set(State::High));
    }
    expected
}

/// One written command frame followed by the flush that ends it.
pub fn write_frame(bytes: &[u8]) -> [SpiTransaction<u8>; 2] {
    [SpiTransaction::write_vec(bytes.to_vec()), SpiTransaction::flush()]
}

/// One received data frame, clocked in against NOP filler, and its flush.
pub fn read_frame(bytes: &[u8]) -> [SpiTransaction<u8>; 2] {
    [
        SpiTransaction::transfer_in_place(vec![0xFF; bytes.len()], bytes.to_vec()),
        SpiTransaction::flush(),
    ]
}

pub fn driver(
    spi: &[SpiTransaction<u8>],
    cs: &[PinTransaction],
    reset: &[PinTransaction],
    clock: FakeClock,
) -> (TestAds1246, RecordingDelay) {
    driver_with_config(spi, cs, reset, clock, DriverConfig::default())
}

pub fn driver_with_config(
    spi: &[SpiTransaction<u8>],
    cs: &[PinTransaction],
    reset: &[PinTransaction],
    clock: FakeClock,
    config: DriverConfig,
) -> (TestAds1246, RecordingDelay) {
    let delay = RecordingDelay::default();
    let bus = HalBus::new(SpiMock::new(spi), clock);
    let adc = Ads1246::new(bus, PinMock::new(cs), PinMock::new(reset), delay.clone(), config).unwrap();
    (adc, delay)
}

/// Check that every mock saw exactly what it expected.
pub fn finish(adc: TestAds1246) {
    let (bus, mut cs, mut reset, _) = adc.release();
    let (mut spi, _) = bus.release();
    spi.done();
    cs.done();
    reset.done();
}
