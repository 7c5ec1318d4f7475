/* Centralize all the context we can about a particular invocation
 *
 * The command line gives us either a build to describe or a firmware image
 * to check against existing metadata, plus where to find any settings
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use std::path::PathBuf;

pub type Filename = PathBuf;

/* what we've been asked to do */
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task
{
    /* produce metadata for a freshly built firmware image */
    Generate
    {
        firmware_version: String,
        hub_type: String,
        mpy_cross_options: Vec<String>,
        map_file: Filename,
        bin_file: Filename,
        out_file: Filename
    },

    /* check a firmware image against its metadata */
    Verify
    {
        metadata_file: Filename,
        bin_file: Filename
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context
{
    config_file: Option<Filename>,
    task: Task
}

impl Context
{
    pub fn new(task: Task) -> Context
    {
        Context { config_file: None, task }
    }

    pub fn set_config_file(&mut self, path: &str)
    {
        self.config_file = Some(PathBuf::from(path));
    }

    pub fn get_config_file(&self) -> Option<&Filename> { self.config_file.as_ref() }
    pub fn get_task(&self) -> &Task { &self.task }
}

impl Task
{
    /* positional arguments are, in order: firmware version, hub type, zero or more
       mpy-cross options, map file, binary file, output file. None if there are too few */
    pub fn generate_from(positionals: &[String]) -> Option<Task>
    {
        if positionals.len() < 5
        {
            return None;
        }

        let (head, files) = positionals.split_at(positionals.len() - 3);
        Some(Task::Generate
        {
            firmware_version: head[0].clone(),
            hub_type: head[1].clone(),
            mpy_cross_options: head[2..].to_vec(),
            map_file: PathBuf::from(&files[0]),
            bin_file: PathBuf::from(&files[1]),
            out_file: PathBuf::from(&files[2])
        })
    }

    /* positional arguments are the metadata file then the binary file */
    pub fn verify_from(positionals: &[String]) -> Option<Task>
    {
        match positionals
        {
            [metadata_file, bin_file] => Some(Task::Verify
            {
                metadata_file: PathBuf::from(metadata_file),
                bin_file: PathBuf::from(bin_file)
            }),
            _ => None
        }
    }
}
