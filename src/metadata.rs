/* Firmware metadata record: assembly, JSON output, and checking an image against it
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use super::digest;
use super::error::{Error, Result};
use super::hub::{ChecksumType, HubType};
use super::mapfile::{self, MapLayout};

use serde_derive::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::convert::TryFrom;
use std::io::Write;
use std::path::Path;

/* metadata file format version */
pub const METADATA_VERSION: &str = "1.1.0";

/* the record written next to each firmware image. fields are declared in
   sorted order so the JSON keys come out sorted */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Metadata
{
    pub checksum_type: ChecksumType,
    pub device_id: u8,
    pub firmware_sha256: String,
    pub firmware_version: String,
    pub hub_name_offset: i64,
    pub max_firmware_size: u64,
    pub max_hub_name_size: u64,
    pub metadata_version: String,
    pub mpy_abi_version: u32,
    pub mpy_cross_options: Vec<String>,
    pub user_mpy_offset: i64
}

/* what the caller knows about the build, as opposed to what's found in its outputs */
#[derive(Debug, Clone)]
pub struct Build<'a>
{
    pub firmware_version: &'a str,
    pub hub: HubType,
    pub mpy_abi_version: u32,
    pub mpy_cross_options: &'a [String]
}

impl Metadata
{
    /* combine the hub's fixed properties, the map's layout, and the image's digest */
    pub fn assemble(build: &Build, layout: &MapLayout, firmware_sha256: String) -> Result<Metadata>
    {
        let info = build.hub.info();

        Ok(Metadata
        {
            checksum_type: info.checksum_type,
            device_id: info.device_id,
            firmware_sha256,
            firmware_version: String::from(build.firmware_version),
            hub_name_offset: flash_offset(layout, ".name", layout.name_start)?,
            max_firmware_size: layout.flash_length,
            max_hub_name_size: layout.name_size,
            metadata_version: String::from(METADATA_VERSION),
            mpy_abi_version: build.mpy_abi_version,
            mpy_cross_options: build.mpy_cross_options.to_vec(),
            user_mpy_offset: flash_offset(layout, ".user", layout.user_start)?
        })
    }

    /* render as pretty-printed JSON with four-space indents */
    pub fn to_json(&self) -> Result<Vec<u8>>
    {
        let mut json = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut json, PrettyFormatter::with_indent(b"    "));
        serde::Serialize::serialize(self, &mut serializer)?;
        Ok(json)
    }

    pub fn from_json(json: &[u8]) -> Result<Metadata>
    {
        Ok(serde_json::from_slice(json)?)
    }

    /* check a firmware image is the one this record describes and that it fits in flash */
    pub fn verify(&self, image: &[u8]) -> Result<()>
    {
        let actual = digest::sha256_hex(image);
        if actual != self.firmware_sha256.to_ascii_lowercase()
        {
            return Err(Error::DigestMismatch { expected: self.firmware_sha256.clone(), actual });
        }

        let size = image.len() as u64;
        if size > self.max_firmware_size
        {
            return Err(Error::ImageTooLarge { size, max: self.max_firmware_size });
        }

        Ok(())
    }
}

/* turn an absolute address into an offset from the start of the firmware in flash.
   the difference of two u64s always fits in an i128, but not necessarily an i64 */
fn flash_offset(layout: &MapLayout, section: &'static str, address: u64) -> Result<i64>
{
    if address < layout.flash_origin
    {
        log::warn!("{} at 0x{:08x} is below the start of flash at 0x{:08x}", section, address, layout.flash_origin);
    }

    let offset = address as i128 - layout.flash_origin as i128;
    i64::try_from(offset).map_err(|_| Error::OffsetOutOfRange { section, address, origin: layout.flash_origin })
}

/* write the rendered metadata to a temporary file next to the destination, then move it
   into place, so the destination either gets the whole file or is left alone */
pub fn write_file(destination: &Path, contents: &[u8]) -> Result<()>
{
    let dir = match destination.parent()
    {
        Some(parent) if parent.as_os_str().is_empty() == false => parent,
        _ => Path::new(".")
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(destination).map_err(|e| e.error)?;

    log::info!("wrote {}", destination.display());
    Ok(())
}

/* produce the metadata for a build from its linker map and binary image.
   nothing is returned unless every piece of information was found */
pub fn generate(build: &Build, map: &str, image: &[u8]) -> Result<Metadata>
{
    let layout = mapfile::parse(map)?;
    let firmware_sha256 = digest::sha256_hex(image);

    log::info!("flash at 0x{:08x}, {} bytes; .name at 0x{:08x}, {} bytes; .user at 0x{:08x}",
        layout.flash_origin, layout.flash_length, layout.name_start, layout.name_size, layout.user_start);

    if image.len() as u64 > layout.flash_length
    {
        log::warn!("firmware image is {} bytes but flash only has room for {}", image.len(), layout.flash_length);
    }

    Metadata::assemble(build, &layout, firmware_sha256)
}
