extern crate std;

use super::ScannerInterface;

use core::cell::Cell;
use embedded_hal_async::delay::DelayNs;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

/// Shared fake time base, advanced only by `FakeDelay`
#[derive(Clone, Default)]
pub struct FakeClock {
    nanos: Rc<Cell<u64>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u32 {
        (self.nanos.get() / 1_000_000) as u32
    }

    pub fn advance_ns(&self, ns: u64) {
        self.nanos.set(self.nanos.get() + ns);
    }
}

pub struct FakeDelay {
    clock: FakeClock,
}

impl FakeDelay {
    pub fn new(clock: &FakeClock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(ns as u64);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ns(ms as u64 * 1_000_000);
    }
}

#[derive(Debug, PartialEq)]
pub struct FakeSerialError;

//bytes that show up on the wire at a given time
struct Arrival {
    at_ms: u32,
    bytes: Vec<u8>,
}

pub struct FakeSerialPort {
    clock: FakeClock,
    rx: VecDeque<u8>,
    arrivals: VecDeque<Arrival>,
    /// replies released one per written frame, after `reply_latency_ms`
    replies: VecDeque<Vec<u8>>,
    pub reply_latency_ms: u32,
    pub sent_frames: Vec<Vec<u8>>,
    pub baudrate: Option<u32>,
    pub fail_writes: bool,
}

impl FakeSerialPort {
    pub fn new(clock: &FakeClock) -> Self {
        FakeSerialPort {
            clock: clock.clone(),
            rx: VecDeque::new(),
            arrivals: VecDeque::new(),
            replies: VecDeque::new(),
            reply_latency_ms: 20,
            sent_frames: Vec::new(),
            baudrate: None,
            fail_writes: false,
        }
    }

    /// Bytes already sitting in the receive buffer
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes that arrive at an absolute fake time
    pub fn schedule_rx(&mut self, at_ms: u32, bytes: &[u8]) {
        self.arrivals.push_back(Arrival {
            at_ms,
            bytes: bytes.to_vec(),
        });
    }

    /// Enqueue the module's answer to the next written frame
    pub fn queue_reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    fn pump(&mut self) {
        let now = self.clock.now_ms();
        let mut idx = 0;
        while idx < self.arrivals.len() {
            if self.arrivals[idx].at_ms <= now {
                if let Some(arrival) = self.arrivals.remove(idx) {
                    self.rx.extend(arrival.bytes);
                }
            } else {
                idx += 1;
            }
        }
    }
}

impl ScannerInterface for FakeSerialPort {
    type InterfaceError = FakeSerialError;

    async fn setup(&mut self, baudrate: u32) -> Result<(), Self::InterfaceError> {
        self.baudrate = Some(baudrate);
        Ok(())
    }

    async fn write_frame(
        &mut self,
        frame: &[u8],
    ) -> Result<(), Self::InterfaceError> {
        if self.fail_writes {
            return Err(FakeSerialError);
        }
        self.sent_frames.push(frame.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            let at_ms = self.clock.now_ms() + self.reply_latency_ms;
            self.arrivals.push_back(Arrival { at_ms, bytes: reply });
        }
        Ok(())
    }

    fn available(&mut self) -> Result<usize, Self::InterfaceError> {
        self.pump();
        Ok(self.rx.len())
    }

    async fn read(
        &mut self,
        recv_buf: &mut [u8],
    ) -> Result<usize, Self::InterfaceError> {
        self.pump();
        let read_len = recv_buf.len().min(self.rx.len());
        for (dest, src) in recv_buf.iter_mut().zip(self.rx.drain(..read_len)) {
            *dest = src;
        }
        Ok(read_len)
    }

    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}
