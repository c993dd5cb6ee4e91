// DANS : src/decoders/meteora/damm_v2/codec.rs

use solana_sdk::pubkey::Pubkey;
use super::error::{DammV2Error, Result};

pub const U128_LEN: usize = 16;

/// Lit un bloc de 16 octets little-endian comme un u128 (compteurs larges et prix Q64.64).
pub fn read_u128_le(data: &[u8]) -> Result<u128> {
    let block: [u8; U128_LEN] = data
        .get(..U128_LEN)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(DammV2Error::TruncatedBuffer { needed: U128_LEN, available: data.len() })?;
    Ok(u128::from_le_bytes(block))
}

/// Inverse de `read_u128_le`.
pub fn write_u128_le(value: u128) -> [u8; U128_LEN] {
    value.to_le_bytes()
}

/// Curseur de lecture positionnel. Chaque lecture avance d'une largeur fixe,
/// l'offset d'un champ est donc entièrement déterminé par l'ordre des lectures.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let remaining = self.data.len().saturating_sub(self.offset);
        let bytes: [u8; N] = self
            .data
            .get(self.offset..self.offset + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(DammV2Error::TruncatedBuffer { needed: N, available: remaining })?;
        self.offset += N;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u128(&mut self) -> Result<u128> {
        let block = self.read_array::<U128_LEN>()?;
        read_u128_le(&block)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey> {
        Ok(Pubkey::new_from_array(self.read_array()?))
    }

    pub fn read_u64_array<const N: usize>(&mut self) -> Result<[u64; N]> {
        let mut out = [0u64; N];
        for slot in out.iter_mut() {
            *slot = self.read_u64()?;
        }
        Ok(out)
    }
}

/// Pendant de `ByteReader` pour la ré-encodage d'un snapshot.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u128(&mut self, value: u128) {
        self.write_bytes(&write_u128_le(value));
    }

    pub fn write_pubkey(&mut self, key: &Pubkey) {
        self.write_bytes(key.as_ref());
    }

    pub fn write_u64_array(&mut self, values: &[u64]) {
        for value in values {
            self.write_u64(*value);
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
