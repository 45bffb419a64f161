//! Host fakes for the hardware traits, shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::bus::BusAddress;
use crate::display::{CharacterDisplay, DisplayConnector, DisplayError};
use crate::network::Network;
use crate::power::DeepSleep;
use crate::sensors::{
    CanonicalReading, DriverKind, DriverRegistry, FloatSensorDriver, FloatValues, Sensor,
    SensorDriver, SensorError, TextSensorDriver, TextValue, TextValues,
};
use crate::telemetry::{Clock, Uploader, UtcDateTime};

/// I2C bus with a fixed set of acknowledging addresses
#[derive(Debug, Default)]
pub struct FakeBus {
    devices: Vec<u8>,
    probes: usize,
    writes: Vec<(u8, Vec<u8>)>,
}

impl FakeBus {
    pub fn with_devices(devices: &[u8]) -> Self {
        Self {
            devices: devices.to_vec(),
            ..Self::default()
        }
    }

    /// Empty writes seen, acknowledged or not.
    pub fn probes(&self) -> usize {
        self.probes
    }

    pub fn writes_to(&self, address: u8) -> usize {
        self.writes.iter().filter(|(a, _)| *a == address).count()
    }

    pub fn written_bytes(&self, address: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .flat_map(|(_, bytes)| bytes.iter().copied())
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.probes = 0;
        self.writes.clear();
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        for operation in operations.iter_mut() {
            if let Operation::Write(bytes) = operation {
                if bytes.is_empty() {
                    self.probes += 1;
                }
                self.writes.push((address, bytes.to_vec()));
            }

            if !self.devices.contains(&address) {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            if let Operation::Read(buffer) = operation {
                buffer.fill(0);
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately and remembers millisecond waits
#[derive(Debug, Default, Clone)]
pub struct FakeDelay {
    waits_ms: Vec<u32>,
}

impl FakeDelay {
    pub fn waits_ms(&self) -> Vec<u32> {
        self.waits_ms.clone()
    }

    pub fn total_ms(&self) -> u32 {
        self.waits_ms.iter().sum()
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_us(&mut self, _us: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Sensor replaying a fixed script of results
pub struct ScriptedSensor {
    script: VecDeque<Result<CanonicalReading, SensorError>>,
    fallback: Option<CanonicalReading>,
    reads: usize,
}

impl ScriptedSensor {
    pub fn new<const N: usize>(script: [Result<CanonicalReading, SensorError>; N]) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: None,
            reads: 0,
        }
    }

    pub fn repeat(reading: CanonicalReading) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Some(reading),
            reads: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Sensor for ScriptedSensor {
    async fn read(&mut self) -> Result<CanonicalReading, SensorError> {
        self.reads += 1;
        match (self.script.pop_front(), self.fallback) {
            (Some(result), _) => result,
            (None, Some(reading)) => Ok(reading),
            (None, None) => Err(SensorError::ReadFailed {
                sensor: "scripted",
                operation: "read",
                details: "script exhausted",
            }),
        }
    }
}

pub fn text_values(temperature: &str, humidity: &str, pressure: &str) -> TextValues {
    let value = |raw: &str| TextValue::try_from(raw).unwrap();
    TextValues {
        temperature: value(temperature),
        humidity: value(humidity),
        pressure: value(pressure),
    }
}

#[derive(Debug, Clone)]
pub struct FakeTextDriver {
    values: TextValues,
}

impl FakeTextDriver {
    pub fn constant(values: TextValues) -> Self {
        Self { values }
    }
}

impl TextSensorDriver for FakeTextDriver {
    type Error = &'static str;

    async fn values(&mut self) -> Result<TextValues, &'static str> {
        Ok(self.values.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FakeFloatDriver {
    values: Option<FloatValues>,
}

impl FakeFloatDriver {
    pub fn constant(values: FloatValues) -> Self {
        Self { values: Some(values) }
    }

    pub fn failing() -> Self {
        Self { values: None }
    }
}

impl FloatSensorDriver for FakeFloatDriver {
    type Error = &'static str;

    async fn measure(&mut self) -> Result<FloatValues, &'static str> {
        self.values.ok_or("measurement timed out")
    }
}

enum Binding {
    Float(FakeFloatDriver),
    Text(FakeTextDriver),
    Refuse,
    Nothing,
}

/// Registry handing out fake drivers
pub struct FakeRegistry {
    binding: Binding,
    binds: usize,
}

impl FakeRegistry {
    pub fn float(values: FloatValues) -> Self {
        Self::with(Binding::Float(FakeFloatDriver::constant(values)))
    }

    pub fn float_failing() -> Self {
        Self::with(Binding::Float(FakeFloatDriver::failing()))
    }

    pub fn text(values: TextValues) -> Self {
        Self::with(Binding::Text(FakeTextDriver::constant(values)))
    }

    pub fn refusing_bind() -> Self {
        Self::with(Binding::Refuse)
    }

    pub fn empty() -> Self {
        Self::with(Binding::Nothing)
    }

    fn with(binding: Binding) -> Self {
        Self { binding, binds: 0 }
    }

    pub fn binds(&self) -> usize {
        self.binds
    }
}

impl DriverRegistry for FakeRegistry {
    type Text = FakeTextDriver;
    type Float = FakeFloatDriver;

    fn available(&self) -> Option<DriverKind> {
        match self.binding {
            Binding::Text(_) => Some(DriverKind::Text),
            Binding::Float(_) | Binding::Refuse => Some(DriverKind::Float),
            Binding::Nothing => None,
        }
    }

    async fn bind(
        &mut self,
        _kind: DriverKind,
        _address: BusAddress,
    ) -> Result<SensorDriver<FakeTextDriver, FakeFloatDriver>, SensorError> {
        self.binds += 1;
        match &self.binding {
            Binding::Float(driver) => Ok(SensorDriver::Float(driver.clone())),
            Binding::Text(driver) => Ok(SensorDriver::Text(driver.clone())),
            Binding::Refuse | Binding::Nothing => Err(SensorError::InitializationFailed {
                sensor: "BME280",
                details: "chip id mismatch",
            }),
        }
    }
}

#[derive(Debug)]
struct Screen {
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
    writes: usize,
    history: Vec<Vec<String>>,
    failing: bool,
}

impl Screen {
    fn new(cols: u8, rows: u8, failing: bool) -> Self {
        Self {
            cells: vec![vec![' '; usize::from(cols)]; usize::from(rows)],
            cursor: (0, 0),
            writes: 0,
            history: Vec::new(),
            failing,
        }
    }

    fn rows(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }
}

/// In-memory character display; clones share one screen.
#[derive(Debug, Clone)]
pub struct FakeDisplay {
    screen: Rc<RefCell<Screen>>,
}

impl FakeDisplay {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            screen: Rc::new(RefCell::new(Screen::new(cols, rows, false))),
        }
    }

    /// A display that stops acknowledging right away.
    pub fn failing(cols: u8, rows: u8) -> Self {
        Self {
            screen: Rc::new(RefCell::new(Screen::new(cols, rows, true))),
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.screen.borrow().rows()[row].clone()
    }

    /// Number of `write_text` calls that reached the screen.
    pub fn writes(&self) -> usize {
        self.screen.borrow().writes
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.screen.borrow().failing {
            Err("no ack from expander")
        } else {
            Ok(())
        }
    }
}

impl CharacterDisplay for FakeDisplay {
    type Error = &'static str;

    async fn clear(&mut self) -> Result<(), &'static str> {
        self.check()?;
        let mut screen = self.screen.borrow_mut();
        for row in screen.cells.iter_mut() {
            row.fill(' ');
        }
        screen.cursor = (0, 0);
        Ok(())
    }

    async fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), &'static str> {
        self.check()?;
        self.screen.borrow_mut().cursor = (usize::from(col), usize::from(row));
        Ok(())
    }

    async fn write_text(&mut self, text: &str) -> Result<(), &'static str> {
        self.check()?;
        let mut screen = self.screen.borrow_mut();
        let (mut col, row) = screen.cursor;
        for ch in text.chars() {
            if let Some(cell) = screen.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = ch;
            }
            col += 1;
        }
        screen.cursor = (col, row);
        screen.writes += 1;
        let snapshot = screen.rows();
        screen.history.push(snapshot);
        Ok(())
    }
}

/// Hands out a 16x2 [`FakeDisplay`] whose screen stays inspectable.
pub struct FakeConnector {
    display: Option<FakeDisplay>,
}

impl FakeConnector {
    pub fn working() -> Self {
        Self {
            display: Some(FakeDisplay::new(16, 2)),
        }
    }

    pub fn broken() -> Self {
        Self { display: None }
    }

    /// Screen contents after every text write.
    pub fn history(&self) -> Vec<Vec<String>> {
        self.display
            .as_ref()
            .map(|d| d.screen.borrow().history.clone())
            .unwrap_or_default()
    }

    pub fn current(&self) -> Vec<String> {
        self.display
            .as_ref()
            .map(|d| d.screen.borrow().rows())
            .unwrap_or_default()
    }
}

impl DisplayConnector for FakeConnector {
    type Display = FakeDisplay;

    async fn attach(
        &mut self,
        address: BusAddress,
        _rows: u8,
        _cols: u8,
    ) -> Result<FakeDisplay, DisplayError> {
        self.display.clone().ok_or(DisplayError::NotResponding {
            address,
            operation: "init",
        })
    }
}

/// Station interface that comes up after a number of status polls
#[derive(Debug, Default)]
pub struct FakeNetwork {
    connected: bool,
    up_after_polls: Option<u32>,
    polls: u32,
    refuse: bool,
    connect_calls: usize,
    credentials: Option<(String, String)>,
}

impl FakeNetwork {
    /// Reports the link up on the `polls`-th status query after `connect`.
    pub fn connecting_after(polls: u32) -> Self {
        Self {
            up_after_polls: Some(polls),
            ..Self::default()
        }
    }

    pub fn never() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls
    }

    pub fn last_credentials(&self) -> Option<(String, String)> {
        self.credentials.clone()
    }
}

impl Network for FakeNetwork {
    type Error = &'static str;

    async fn is_connected(&mut self) -> Result<bool, &'static str> {
        if !self.connected && self.connect_calls > 0 {
            if let Some(needed) = self.up_after_polls {
                self.polls += 1;
                self.connected = self.polls >= needed;
            }
        }
        Ok(self.connected)
    }

    async fn connect(&mut self, ssid: &str, password: &str) -> Result<(), &'static str> {
        if self.refuse {
            return Err("radio not started");
        }
        self.connect_calls += 1;
        self.credentials = Some((ssid.into(), password.into()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub content_type: String,
    pub body: String,
}

/// Records every POST and answers with a fixed status
#[derive(Debug, Default)]
pub struct FakeUploader {
    status: Option<u16>,
    requests: Vec<Request>,
}

impl FakeUploader {
    pub fn answering(status: u16) -> Self {
        Self {
            status: Some(status),
            requests: Vec::new(),
        }
    }

    /// Every request fails at the transport level.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

impl Uploader for FakeUploader {
    type Error = &'static str;

    async fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<u16, &'static str> {
        self.requests.push(Request {
            url: url.into(),
            content_type: content_type.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        self.status.ok_or("connection refused")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FakeClock {
    now: Option<UtcDateTime>,
}

impl FakeClock {
    pub fn unset() -> Self {
        Self { now: None }
    }

    pub fn at(now: UtcDateTime) -> Self {
        Self { now: Some(now) }
    }
}

impl Clock for FakeClock {
    fn now(&mut self) -> Option<UtcDateTime> {
        self.now
    }
}

#[derive(Debug, Default)]
pub struct RecordingSleeper {
    requests: Vec<u32>,
}

impl RecordingSleeper {
    pub fn requests(&self) -> &[u32] {
        &self.requests
    }
}

impl DeepSleep for RecordingSleeper {
    fn sleep(&mut self, duration_ms: u32) {
        self.requests.push(duration_ms);
    }
}
