/* Supported hubs and their fixed firmware properties
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use super::error::{Error, Result};
use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;

/* algorithm the hub's bootloader uses to checksum a firmware image */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType
{
    Sum,
    Crc32
}

/* hardware variants we can generate metadata for */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubType
{
    MoveHub,
    CityHub,
    TechnicHub,
    PrimeHub,
    EssentialHub
}

/* per-hub constants that end up in the metadata */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubInfo
{
    pub device_id: u8,
    pub checksum_type: ChecksumType
}

/* hub name as given on the command line, paired with the hub.
   entries are in the same order as the HubType variants */
pub const HUBS: [(&str, HubType); 5] =
[
    ("move_hub",      HubType::MoveHub),
    ("city_hub",      HubType::CityHub),
    ("technic_hub",   HubType::TechnicHub),
    ("prime_hub",     HubType::PrimeHub),
    ("essential_hub", HubType::EssentialHub)
];

impl HubType
{
    pub fn name(&self) -> &'static str
    {
        HUBS[*self as usize].0
    }

    pub fn info(&self) -> HubInfo
    {
        let (device_id, checksum_type) = match self
        {
            HubType::MoveHub      => (0x40, ChecksumType::Sum),
            HubType::CityHub      => (0x41, ChecksumType::Sum),
            HubType::TechnicHub   => (0x80, ChecksumType::Sum),
            HubType::PrimeHub     => (0x81, ChecksumType::Crc32),
            HubType::EssentialHub => (0x83, ChecksumType::Crc32)
        };

        HubInfo { device_id, checksum_type }
    }
}

impl FromStr for HubType
{
    type Err = Error;

    fn from_str(name: &str) -> Result<HubType>
    {
        match HUBS.iter().find(|(key, _)| *key == name)
        {
            Some((_, hub)) => Ok(*hub),
            None => Err(Error::InvalidVariant(String::from(name)))
        }
    }
}

/* find the named hub */
pub fn resolve(name: &str) -> Result<HubType>
{
    let hub = name.parse::<HubType>()?;
    let info = hub.info();
    log::info!("hub {}: device id 0x{:02x}, {:?} checksum", hub.name(), info.device_id, info.checksum_type);
    Ok(hub)
}
