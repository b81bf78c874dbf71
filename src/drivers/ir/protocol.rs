use crate::error::{HalError, Result};

pub const LIRC_GET_FEATURES: u32 = 0x8004_6900;
pub const LIRC_GET_LENGTH: u32 = 0x8004_690F;
pub const LIRC_SET_LENGTH: u32 = 0x4004_6910;
pub const LIRC_GET_FREQUENCY: u32 = 0x8004_6924;
pub const LIRC_SET_FREQUENCY: u32 = 0x4004_6925;

/// Bytes per encoded pulse/space duration.
pub const DURATION_SIZE: usize = 4;

/// Control request understood by the transceiver. Every request moves a
/// single `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    GetFeatures,
    GetLength,
    SetLength(u32),
    GetFrequency,
    SetFrequency(u32),
}

impl Request {
    pub fn code(&self) -> u32 {
        match *self {
            Request::GetFeatures => LIRC_GET_FEATURES,
            Request::GetLength => LIRC_GET_LENGTH,
            Request::SetLength(_) => LIRC_SET_LENGTH,
            Request::GetFrequency => LIRC_GET_FREQUENCY,
            Request::SetFrequency(_) => LIRC_SET_FREQUENCY,
        }
    }

    /// Value carried by a set request.
    pub fn argument(&self) -> Option<u32> {
        match *self {
            Request::SetLength(v) | Request::SetFrequency(v) => Some(v),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Request::GetFeatures => "get-features",
            Request::GetLength => "get-length",
            Request::SetLength(_) => "set-length",
            Request::GetFrequency => "get-frequency",
            Request::SetFrequency(_) => "set-frequency",
        }
    }
}

/// Validated IR pattern: carrier frequency plus at least one duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePattern<'a> {
    frequency: u32,
    durations: &'a [i32],
}

impl<'a> PulsePattern<'a> {
    /// Splits `raw` into carrier frequency (Hz) and pulse/space durations (µs).
    pub fn parse(raw: &'a [i32]) -> Result<Self> {
        match raw {
            [frequency, durations @ ..] if !durations.is_empty() => Ok(Self {
                frequency: *frequency as u32,
                durations,
            }),
            _ => Err(HalError::InvalidArgument(format!(
                "IR pattern needs a frequency and at least one duration, got {} values",
                raw.len()
            ))),
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn durations(&self) -> &'a [i32] {
        self.durations
    }

    /// Length in bytes of the encoded payload.
    pub fn payload_len(&self) -> usize {
        self.durations.len() * DURATION_SIZE
    }

    /// Packs every duration as a little-endian `u32`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(self.payload_len())?;
        for &duration in self.durations {
            buf.extend_from_slice(&(duration as u32).to_le_bytes());
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn encode_reference_pattern() {
        let raw = [38000, 500, 1000, 500];
        let pattern = PulsePattern::parse(&raw).unwrap();

        assert_eq!(pattern.frequency(), 38000);
        assert_eq!(pattern.payload_len(), 12);
        assert_eq!(
            pattern.encode().unwrap(),
            vec![0xF4, 0x01, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00, 0xF4, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn negative_duration_keeps_bit_pattern() {
        let raw = [38000, -1];
        let pattern = PulsePattern::parse(&raw).unwrap();
        assert_eq!(pattern.encode().unwrap(), vec![0xFF; 4]);
    }

    #[test]
    fn frequency_only_is_rejected() {
        assert!(matches!(
            PulsePattern::parse(&[38000]),
            Err(HalError::InvalidArgument(_))
        ));
        assert!(matches!(
            PulsePattern::parse(&[]),
            Err(HalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn request_codes() {
        assert_eq!(Request::GetLength.code(), 2147772687);
        assert_eq!(Request::SetLength(12).code(), 1074030864);
        assert_eq!(Request::GetFrequency.code(), 2147772708);
        assert_eq!(Request::SetFrequency(38000).code(), 1074030885);
        assert_eq!(Request::GetFeatures.code(), 2147772672);
        assert_eq!(Request::SetFrequency(38000).argument(), Some(38000));
        assert_eq!(Request::GetLength.argument(), None);
    }

    proptest! {
        #[test]
        fn payload_is_four_bytes_per_duration(
            durations in prop::collection::vec(any::<i32>(), 1..64)
        ) {
            let mut raw = vec![38000];
            raw.extend_from_slice(&durations);
            let pattern = PulsePattern::parse(&raw).unwrap();
            let buf = pattern.encode().unwrap();

            prop_assert_eq!(buf.len(), durations.len() * 4);
            for (chunk, &d) in buf.chunks(4).zip(durations.iter()) {
                prop_assert_eq!(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]), d as u32);
            }
        }
    }
}
