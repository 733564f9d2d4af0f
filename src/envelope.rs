/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::constants::{ENVELOPE_HEADER_LENGTH, ENVELOPE_LENGTH_OFFSET};
#[cfg(feature = "defmt")]
use defmt::println;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnvelopeError {
    /// Fewer bytes than the 5-byte header
    TooShort(usize),
    /// Header declares more payload than was received
    Truncated { declared: u16, received: usize },
}

/// A framed info/response message: 3 bytes echo, 2 bytes BE length, payload
#[derive(Debug, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub header: [u8; 3],
    pub payload: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Validate and split a response buffer.
    /// Bytes beyond the declared payload are ignored.
    pub fn parse(response: &'a [u8]) -> Result<Self, EnvelopeError> {
        let declared = declared_payload_len(response)
            .ok_or(EnvelopeError::TooShort(response.len()))?;
        let end = ENVELOPE_HEADER_LENGTH + declared as usize;
        if response.len() < end {
            return Err(EnvelopeError::Truncated {
                declared,
                received: response.len(),
            });
        }
        let mut header = [0u8; 3];
        header.copy_from_slice(&response[..3]);
        Ok(Envelope {
            header,
            payload: &response[ENVELOPE_HEADER_LENGTH..end],
        })
    }
}

fn declared_payload_len(response: &[u8]) -> Option<u16> {
    if response.len() < ENVELOPE_HEADER_LENGTH {
        return None;
    }
    Some(u16::from_be_bytes([
        response[ENVELOPE_LENGTH_OFFSET],
        response[ENVELOPE_LENGTH_OFFSET + 1],
    ]))
}

/// Declared payload length, or 0 if the header is incomplete
pub fn response_data_size(response: &[u8]) -> u16 {
    match declared_payload_len(response) {
        Some(size) => size,
        None => {
            #[cfg(feature = "defmt")]
            println!("invalid response size: {}", response.len());
            0
        }
    }
}

/// Usable payload length; 0 for an empty, short, or truncated envelope alike
pub fn checked_data_size(response: &[u8]) -> u16 {
    match Envelope::parse(response) {
        Ok(envelope) => envelope.payload.len() as u16,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            println!("invalid envelope: {}", _e);
            0
        }
    }
}
