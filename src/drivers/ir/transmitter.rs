use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, warn};

use super::{
    device_io::{Transceiver, TransceiverOpener},
    protocol::{PulsePattern, Request},
};
use crate::error::{HalError, Result};

/// Drives one IR transceiver.
///
/// Each transmission opens the control device, negotiates carrier
/// frequency and payload length, writes the payload and closes the device
/// again. Transmissions sharing a lock never interleave.
#[derive(Debug, Clone)]
pub struct IrTransmitter {
    opener: Arc<dyn TransceiverOpener>,
    lock: Arc<Mutex<()>>,
}

impl IrTransmitter {
    pub fn new(opener: Arc<dyn TransceiverOpener>, lock: Arc<Mutex<()>>) -> Self {
        Self { opener, lock }
    }

    /// Sends `raw`: carrier frequency in Hz followed by pulse/space
    /// durations in microseconds.
    ///
    /// # Errors
    ///
    /// * [`HalError::InvalidArgument`] for a pattern without durations
    /// * [`HalError::NoDevice`] if the control device cannot be opened
    /// * [`HalError::Negotiation`] if frequency or length cannot be set
    /// * [`HalError::Transmission`] on a failed or short write
    pub fn transmit(&self, raw: &[i32]) -> Result<()> {
        let pattern = PulsePattern::parse(raw).inspect_err(|e| error!("{e}"))?;
        let payload = pattern.encode()?;
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            HalError::InvalidArgument(format!("IR payload of {} bytes", payload.len()))
        })?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut dev = self.opener.open().map_err(|source| {
            error!("Unable to open the device {}: {source}", self.opener.path().display());
            HalError::NoDevice {
                path: self.opener.path().to_path_buf(),
                source,
            }
        })?;

        match dev.control(Request::GetFeatures) {
            Ok(features) => debug!("IR transceiver features {features:#010x}"),
            Err(e) => debug!("IR transceiver features unavailable: {e}"),
        }

        negotiate(
            dev.as_mut(),
            Request::GetFrequency,
            pattern.frequency(),
            Request::SetFrequency,
        )?;
        negotiate(dev.as_mut(), Request::GetLength, payload_len, Request::SetLength)?;

        match dev.write(&payload) {
            Ok(n) if n == payload.len() => Ok(()),
            Ok(n) => {
                error!("Failed to write everything, wrote {n} of {payload_len} bytes");
                Err(HalError::Transmission(format!(
                    "short write: {n} of {payload_len} bytes"
                )))
            }
            Err(e) => {
                error!("Unable to write to the device: {e}");
                Err(HalError::Transmission(e.to_string()))
            }
        }
    }
}

/// Brings a transceiver parameter to `wanted`.
///
/// A failed query counts as a mismatch; a failed set aborts the transmission.
fn negotiate(
    dev: &mut dyn Transceiver,
    query: Request,
    wanted: u32,
    set: fn(u32) -> Request,
) -> Result<()> {
    match dev.control(query) {
        Ok(current) if current == wanted => return Ok(()),
        Ok(current) => debug!("{} reports {current}, need {wanted}", query.name()),
        Err(e) => warn!("Failed to {}: {e}", query.name()),
    }

    let request = set(wanted);
    dev.control(request).map(|_| ()).map_err(|source| {
        error!("{} {wanted} failed: {source}", request.name());
        HalError::Negotiation {
            request: request.name(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{
        io,
        path::{Path, PathBuf},
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    /// Scripted transceiver behavior.
    #[derive(Debug, Clone, Default)]
    struct Script {
        frequency: u32,
        length: u32,
        fail_get: bool,
        fail_set_frequency: bool,
        fail_set_length: bool,
        short_by: usize,
        fail_write: bool,
        write_delay: Duration,
    }

    /// What the fake transceiver saw.
    #[derive(Debug, Default)]
    struct Journal {
        opens: AtomicUsize,
        closes: AtomicUsize,
        requests: Mutex<Vec<Request>>,
        written: Mutex<Vec<u8>>,
        /// `open`/`close` markers in the order they happened.
        events: Mutex<Vec<&'static str>>,
    }

    struct FakeTransceiver {
        script: Script,
        journal: Arc<Journal>,
    }

    impl Transceiver for FakeTransceiver {
        fn control(&mut self, request: Request) -> io::Result<u32> {
            self.journal.requests.lock().unwrap().push(request);
            match request {
                Request::GetFeatures => Ok(0x100),
                Request::GetFrequency | Request::GetLength if self.script.fail_get => {
                    Err(io::Error::from_raw_os_error(libc::ENOTTY))
                }
                Request::GetFrequency => Ok(self.script.frequency),
                Request::GetLength => Ok(self.script.length),
                Request::SetFrequency(_) if self.script.fail_set_frequency => {
                    Err(io::Error::from_raw_os_error(libc::EINVAL))
                }
                Request::SetLength(_) if self.script.fail_set_length => {
                    Err(io::Error::from_raw_os_error(libc::EINVAL))
                }
                Request::SetFrequency(v) | Request::SetLength(v) => Ok(v),
            }
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            thread::sleep(self.script.write_delay);
            if self.script.fail_write {
                return Err(io::Error::from_raw_os_error(libc::EIO));
            }
            let n = buf.len().saturating_sub(self.script.short_by);
            self.journal.written.lock().unwrap().extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    impl Drop for FakeTransceiver {
        fn drop(&mut self) {
            self.journal.events.lock().unwrap().push("close");
            self.journal.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Debug)]
    struct FakeOpener {
        path: PathBuf,
        script: Script,
        missing: bool,
        journal: Arc<Journal>,
    }

    impl FakeOpener {
        fn new(script: Script) -> Self {
            Self {
                path: PathBuf::from("/dev/lirc0"),
                script,
                missing: false,
                journal: Arc::new(Journal::default()),
            }
        }
    }

    impl TransceiverOpener for FakeOpener {
        fn open(&self) -> io::Result<Box<dyn Transceiver>> {
            if self.missing {
                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
            self.journal.events.lock().unwrap().push("open");
            self.journal.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeTransceiver {
                script: self.script.clone(),
                journal: self.journal.clone(),
            }))
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    fn transmitter(opener: FakeOpener) -> (IrTransmitter, Arc<Journal>) {
        let journal = opener.journal.clone();
        (
            IrTransmitter::new(Arc::new(opener), Arc::new(Mutex::new(()))),
            journal,
        )
    }

    fn set_requests(journal: &Journal) -> Vec<Request> {
        journal
            .requests
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|r| r.argument().is_some())
            .collect()
    }

    #[test]
    fn negotiates_and_writes_payload() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 36000,
            length: 4,
            ..Default::default()
        }));

        tx.transmit(&[38000, 500, 1000, 500]).unwrap();

        assert_eq!(
            set_requests(&journal),
            vec![Request::SetFrequency(38000), Request::SetLength(12)]
        );
        assert_eq!(
            *journal.written.lock().unwrap(),
            vec![0xF4, 0x01, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00, 0xF4, 0x01, 0x00, 0x00]
        );
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn matching_parameters_skip_set_requests() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            length: 8,
            ..Default::default()
        }));

        tx.transmit(&[38000, 9000, 4500]).unwrap();

        assert!(set_requests(&journal).is_empty());
    }

    #[test]
    fn failed_queries_still_negotiate() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            length: 4,
            fail_get: true,
            ..Default::default()
        }));

        tx.transmit(&[38000, 560]).unwrap();

        assert_eq!(
            set_requests(&journal),
            vec![Request::SetFrequency(38000), Request::SetLength(4)]
        );
    }

    #[test]
    fn frequency_only_pattern_never_opens_device() {
        let (tx, journal) = transmitter(FakeOpener::new(Script::default()));

        assert!(matches!(tx.transmit(&[38000]), Err(HalError::InvalidArgument(_))));
        assert_eq!(journal.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_device_is_no_device() {
        let mut opener = FakeOpener::new(Script::default());
        opener.missing = true;
        let (tx, _) = transmitter(opener);

        match tx.transmit(&[38000, 500]) {
            Err(HalError::NoDevice { path, .. }) => assert_eq!(path, PathBuf::from("/dev/lirc0")),
            other => panic!("expected NoDevice, got {other:?}"),
        }
    }

    #[test]
    fn set_frequency_failure_aborts_before_write() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            fail_set_frequency: true,
            ..Default::default()
        }));

        match tx.transmit(&[38000, 500]) {
            Err(HalError::Negotiation { request, .. }) => assert_eq!(request, "set-frequency"),
            other => panic!("expected Negotiation, got {other:?}"),
        }
        assert!(journal.written.lock().unwrap().is_empty());
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_length_failure_aborts_before_write() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            fail_set_length: true,
            ..Default::default()
        }));

        match tx.transmit(&[38000, 500]) {
            Err(HalError::Negotiation { request, .. }) => assert_eq!(request, "set-length"),
            other => panic!("expected Negotiation, got {other:?}"),
        }
        assert!(journal.written.lock().unwrap().is_empty());
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn short_write_is_transmission_error_and_closes_once() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            length: 12,
            short_by: 4,
            ..Default::default()
        }));

        assert!(matches!(
            tx.transmit(&[38000, 500, 1000, 500]),
            Err(HalError::Transmission(_))
        ));
        assert_eq!(journal.opens.load(Ordering::SeqCst), 1);
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn write_error_is_transmission_error() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            fail_write: true,
            ..Default::default()
        }));

        assert!(matches!(
            tx.transmit(&[38000, 500]),
            Err(HalError::Transmission(_))
        ));
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_transmission_reopens_device() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            length: 4,
            ..Default::default()
        }));

        for _ in 0..3 {
            tx.transmit(&[38000, 500]).unwrap();
        }
        assert_eq!(journal.opens.load(Ordering::SeqCst), 3);
        assert_eq!(journal.closes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn features_are_queried_first() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 38000,
            length: 4,
            ..Default::default()
        }));

        tx.transmit(&[38000, 500]).unwrap();

        assert_eq!(
            *journal.requests.lock().unwrap(),
            vec![Request::GetFeatures, Request::GetFrequency, Request::GetLength]
        );
    }

    #[test]
    fn concurrent_transmissions_do_not_interleave() {
        let (tx, journal) = transmitter(FakeOpener::new(Script {
            frequency: 36000,
            length: 0,
            write_delay: Duration::from_millis(20),
            ..Default::default()
        }));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for _ in 0..3 {
                        tx.transmit(&[38000, 500, 1000]).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let events = journal.events.lock().unwrap();
        assert_eq!(events.len(), 12);
        for pair in events.chunks(2) {
            assert_eq!(pair, ["open", "close"]);
        }
        // one set-frequency and one set-length per transmission, in order
        let sets = set_requests(&journal);
        assert_eq!(sets.len(), 12);
        for pair in sets.chunks(2) {
            assert_eq!(pair, [Request::SetFrequency(38000), Request::SetLength(8)]);
        }
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let opener = FakeOpener::new(Script {
            frequency: 38000,
            length: 4,
            ..Default::default()
        });
        let journal = opener.journal.clone();
        let lock = Arc::new(Mutex::new(()));
        let tx = IrTransmitter::new(Arc::new(opener), lock.clone());

        let poisoner = lock.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("holder died");
        })
        .join();
        assert!(lock.is_poisoned());

        tx.transmit(&[38000, 500]).unwrap();
        assert_eq!(journal.opens.load(Ordering::SeqCst), 1);
        assert_eq!(journal.closes.load(Ordering::SeqCst), 1);
    }
}
