/* Parse the optional settings file
 *
 * The file is toml, for example:
 *
 *   [metadata]
 *   mpy_abi_version = 6
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use super::error::Result;
use serde_derive::Deserialize;
use std::path::Path;

/* .mpy ABI version of the MicroPython the firmware is built from */
pub const MPY_VERSION: u32 = 6;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config
{
    #[serde(default)]
    metadata: MetadataSettings
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataSettings
{
    mpy_abi_version: Option<u32>
}

impl Config
{
    pub fn get_mpy_abi_version(&self) -> u32
    {
        self.metadata.mpy_abi_version.unwrap_or(MPY_VERSION)
    }
}

/* load the given file into memory and parse it, returning a config structure */
pub fn parse_config(filename: &Path) -> Result<Config>
{
    let contents = std::fs::read_to_string(filename)?;
    parse_config_str(&contents)
}

pub fn parse_config_str(contents: &str) -> Result<Config>
{
    let config: Config = toml::from_str(contents)?;
    log::debug!("config: {:?}", config);
    Ok(config)
}

/* settings used when no configuration file is given */
pub fn default_config() -> Config
{
    Config::default()
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_use_builtin_abi()
    {
        assert_eq!(default_config().get_mpy_abi_version(), MPY_VERSION);
        assert_eq!(parse_config_str("").unwrap().get_mpy_abi_version(), MPY_VERSION);
        assert_eq!(parse_config_str("[metadata]\n").unwrap().get_mpy_abi_version(), MPY_VERSION);
    }

    #[test]
    fn abi_version_can_be_overridden()
    {
        let config = parse_config_str("[metadata]\nmpy_abi_version = 5\n").unwrap();
        assert_eq!(config.get_mpy_abi_version(), 5);
    }

    #[test]
    fn bad_settings_are_rejected()
    {
        for contents in ["[metadata]\nmpy_abi_version = \"six\"\n", "[metadata]\nabi = 5\n", "not toml ["].iter()
        {
            match parse_config_str(contents)
            {
                Err(Error::Config(_)) => (),
                other => panic!("expected a config error for {:?}, got {:?}", contents, other)
            }
        }
    }
}
