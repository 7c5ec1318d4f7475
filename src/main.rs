/* fwmetadata
 *
 * Generates the metadata file that accompanies a hub firmware image
 *
 * Syntax: fwmetadata [options] <firmware-version> <hub-type> [<mpy-cross-option>...] <map-file> <bin-file> <output-file>
 *         fwmetadata [options] ++verify <metadata-file> <bin-file>
 *
 * It accepts the following options, all of which must come before the first positional argument:
 *
 * ++config <file>  Read settings from toml file <file>, described in config.rs
 * ++verify         Check <bin-file> against an existing <metadata-file> rather than generating metadata
 *
 * ++help           Display minimal usage information
 * ++version        Display version information
 *
 * The metadata is a JSON object describing the firmware: which hub it's for, a SHA-256 of the image,
 * and where in flash the hub name and user program live, the latter found from the linker's map file.
 * Set RUST_LOG=info or RUST_LOG=debug to see what's going on.
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

extern crate toml;
extern crate serde;
extern crate serde_derive;
extern crate tempfile;

use std::path::Path;

#[macro_use]
mod debug;   /* fatal error reporting */
mod cmd;     /* command-line parser */
mod context; /* describe the task at hand */
mod config;  /* configuration file parser */
mod error;   /* error types */
mod hub;     /* table of supported hubs */
mod mapfile; /* linker map file parser */
mod digest;  /* firmware image hashing */
mod metadata; /* assemble, output, and check metadata */

use context::Task;
use metadata::{Build, Metadata};

fn main()
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    /* find out what needs to be done from command line arguments */
    let context = cmd::parse_args();

    /* pick up settings, if any */
    let config = match context.get_config_file()
    {
        Some(filename) => match config::parse_config(filename)
        {
            Ok(c) => c,
            Err(e) => fatal_msg!("Can't load configuration file {}: {}", filename.display(), e)
        },
        None => config::default_config()
    };

    match context.get_task()
    {
        Task::Generate { firmware_version, hub_type, mpy_cross_options, map_file, bin_file, out_file } =>
        {
            /* reject an unknown hub before touching any files */
            let hub = match hub::resolve(hub_type)
            {
                Ok(hub) => hub,
                Err(e) => fatal_msg!("{}", e)
            };

            let build = Build
            {
                firmware_version,
                hub,
                mpy_abi_version: config.get_mpy_abi_version(),
                mpy_cross_options
            };

            /* read everything in first. nothing is written unless all of it checks out */
            let map = String::from_utf8_lossy(&load_file_into_bytes(map_file)).into_owned();
            let image = load_file_into_bytes(bin_file);

            let json = match metadata::generate(&build, &map, &image).and_then(|m| m.to_json())
            {
                Ok(json) => json,
                Err(e) => fatal_msg!("{}", e)
            };

            if let Err(e) = metadata::write_file(out_file, &json)
            {
                fatal_msg!("Unable to write metadata file {}: {}", out_file.display(), e);
            }
        },

        Task::Verify { metadata_file, bin_file } =>
        {
            let metadata = match Metadata::from_json(&load_file_into_bytes(metadata_file))
            {
                Ok(m) => m,
                Err(e) => fatal_msg!("Can't read metadata file {}: {}", metadata_file.display(), e)
            };

            let image = load_file_into_bytes(bin_file);
            if let Err(e) = metadata.verify(&image)
            {
                fatal_msg!("{} does not match {}: {}", bin_file.display(), metadata_file.display(), e);
            }
            println!("{}: OK", bin_file.display());
        }
    }
}

/* generic function to load a file into a byte vector, or bail on error */
pub fn load_file_into_bytes(filename: &Path) -> Vec<u8>
{
    match std::fs::read(filename)
    {
        Ok(s) => s,
        Err(e) => fatal_msg!("Cannot read file {}: {}", filename.display(), e)
    }
}
