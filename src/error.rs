/* Everything that can go wrong while generating or checking metadata
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use thiserror::Error;

/* structural facts that must be recovered from the linker map */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralField
{
    FlashOrigin,
    FlashLength,
    NameStart,
    UserStart
}

impl std::fmt::Display for StructuralField
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        match self
        {
            StructuralField::FlashOrigin => write!(f, "'FLASH' start address"),
            StructuralField::FlashLength => write!(f, "'FLASH' length"),
            StructuralField::NameStart   => write!(f, "'.name' start address"),
            StructuralField::UserStart   => write!(f, "'.user' start address")
        }
    }
}

#[derive(Debug, Error)]
pub enum Error
{
    #[error("Unknown hub type {0}")]
    InvalidVariant(String),

    #[error("Failed to find {0}")]
    MissingStructuralField(StructuralField),

    /* passed through as-is so the caller sees the OS's own message */
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Can't parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Bad metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{section} at 0x{address:x} is too far from the start of flash at 0x{origin:x}")]
    OffsetOutOfRange { section: &'static str, address: u64, origin: u64 },

    #[error("Firmware SHA-256 mismatch: metadata says {expected}, image is {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Firmware image is {size} bytes, larger than the {max} bytes available")]
    ImageTooLarge { size: u64, max: u64 }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn missing_fields_have_distinct_messages()
    {
        let messages: Vec<String> =
        [
            StructuralField::FlashOrigin,
            StructuralField::FlashLength,
            StructuralField::NameStart,
            StructuralField::UserStart
        ]
        .iter()
        .map(|field| Error::MissingStructuralField(*field).to_string())
        .collect();

        assert_eq!(messages[0], "Failed to find 'FLASH' start address");
        assert_eq!(messages[1], "Failed to find 'FLASH' length");
        assert_eq!(messages[2], "Failed to find '.name' start address");
        assert_eq!(messages[3], "Failed to find '.user' start address");
    }

    #[test]
    fn io_errors_keep_their_message()
    {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert_eq!(Error::from(io).to_string(), "no such file");
    }
}
