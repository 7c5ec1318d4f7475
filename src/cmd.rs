/* fwmetadata command-line parser
 *
 * Options use a + prefix so mpy-cross options, which start with -, can be
 * passed through untouched. Options are only recognized before the first
 * positional argument; everything from then on is positional.
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

use super::context::{ Context, Task };

/* use a state machine to analyze command line args */
#[derive(Clone, Copy, PartialEq, Eq)]
enum State
{
    ExpectingAnything,
    ExpectingConfigFile,
    ExpectingPositional
}

/* outcome of parsing the command line */
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed
{
    Run(Context),
    Help,
    Version,
    Usage
}

/* convert command-line arguments into a native context structure, or bail out */
pub fn parse_args() -> Context
{
    /* get the command-line arguments as a list of strings, skipping
    the first argument because it's just the program name */
    let args = std::env::args().skip(1).collect::<Vec<String>>();

    match parse(&args)
    {
        Parsed::Run(context) => context,
        Parsed::Help => help_exit(),
        Parsed::Version => version_exit(),
        Parsed::Usage => usage_die()
    }
}

pub fn parse(args: &[String]) -> Parsed
{
    let mut state = State::ExpectingAnything;
    let mut config_file: Option<&String> = None;
    let mut verify = false;
    let mut positionals: Vec<String> = Vec::new();

    for arg in args
    {
        match state
        {
            /* argument could be a switch or the first positional */
            State::ExpectingAnything =>
            {
                match arg.as_str()
                {
                    "+h" | "++help" => return Parsed::Help,
                    "++version" => return Parsed::Version,

                    /* next command line argument must be the settings filename */
                    "+c" | "++config" => state = State::ExpectingConfigFile,

                    /* check an image against metadata rather than generate metadata */
                    "++verify" => verify = true,

                    _ =>
                    {
                        positionals.push(arg.clone());
                        state = State::ExpectingPositional;
                    }
                }
            },

            State::ExpectingConfigFile =>
            {
                config_file = Some(arg);
                state = State::ExpectingAnything;
            },

            State::ExpectingPositional => positionals.push(arg.clone())
        }
    }

    /* ran out of arguments while waiting for a filename */
    if state == State::ExpectingConfigFile
    {
        return Parsed::Usage;
    }

    let task = match verify
    {
        true => Task::verify_from(&positionals),
        false => Task::generate_from(&positionals)
    };

    match task
    {
        Some(task) =>
        {
            let mut context = Context::new(task);
            if let Some(path) = config_file
            {
                context.set_config_file(path);
            }
            Parsed::Run(context)
        },
        None => Parsed::Usage
    }
}

fn usage() -> String
{
    format!("Usage: {0} [++config <file>] <firmware-version> <hub-type> [<mpy-cross-option>...] <map-file> <bin-file> <output-file>\n\
             \x20      {0} [++config <file>] ++verify <metadata-file> <bin-file>",
             env!("CARGO_BIN_NAME"))
}

/* software information and error messages */
fn help_exit() -> !
{
    println!("{}\n\nGenerate firmware metadata.\n\nHub types: {}", usage(),
        super::hub::HUBS.iter().map(|(name, _)| *name).collect::<Vec<&str>>().join(", "));
    std::process::exit(0);
}

fn version_exit() -> !
{
    println!("{} {} by {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));
    std::process::exit(0);
}

fn usage_die() -> !
{
    eprintln!("{}", usage());
    std::process::exit(1);
}
