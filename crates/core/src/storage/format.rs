use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying a Finance Tracker vault file.
pub const MAGIC: &[u8; 4] = b"FTVA";

/// Current vault container version.
pub const CURRENT_VERSION: u16 = 1;

/// Fixed header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) = 46.
/// Everything after the header is ciphertext.
pub const HEADER_SIZE: usize = 46;

/// Header parsed from a vault file.
#[derive(Debug)]
pub struct VaultHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
}

/// Assemble a complete vault file.
///
/// Layout:
/// ```text
/// [FTVA: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext: rest]
/// ```
pub fn write_vault(
    kdf_params: &KdfParams,
    salt: &[u8; 16],
    nonce: &[u8; 12],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);
    buf
}

/// Parse a vault file into its header and ciphertext slice.
pub fn read_vault(data: &[u8]) -> Result<(VaultHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidVaultFormat(
            "File too small to be a vault".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidVaultFormat(
            "Bad magic bytes — not a vault file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVaultVersion(version));
    }

    let read_u32 = |offset: usize| -> Result<u32, CoreError> {
        data[offset..offset + 4]
            .try_into()
            .map(u32::from_le_bytes)
            .map_err(|_| CoreError::InvalidVaultFormat("Truncated KDF params".into()))
    };
    let memory_cost = read_u32(6)?;
    let time_cost = read_u32(10)?;
    let parallelism = read_u32(14)?;

    // Bound the KDF cost so a crafted header cannot exhaust the machine:
    // memory 8 KiB..1 GiB, at most 20 iterations, at most 16 lanes.
    if !(8..=1_048_576).contains(&memory_cost) {
        return Err(CoreError::InvalidVaultFormat(format!(
            "KDF memory_cost out of range: {memory_cost}"
        )));
    }
    if !(1..=20).contains(&time_cost) {
        return Err(CoreError::InvalidVaultFormat(format!(
            "KDF time_cost out of range: {time_cost}"
        )));
    }
    if !(1..=16).contains(&parallelism) {
        return Err(CoreError::InvalidVaultFormat(format!(
            "KDF parallelism out of range: {parallelism}"
        )));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[18..34]);
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[34..46]);

    let header = VaultHeader {
        version,
        kdf_params: KdfParams {
            memory_cost,
            time_cost,
            parallelism,
        },
        salt,
        nonce,
    };

    Ok((header, &data[HEADER_SIZE..]))
}
