/* Fatal diagnostics
 *
 * (c) Chris Williams, 2021.
 *
 * See LICENSE for usage and copying.
 */

/* print a diagnostic prefixed with the tool's name to stderr and exit with status 1.
   goes straight to stderr rather than through the logger so RUST_LOG can't hide it */
#[macro_export]
macro_rules! fatal_msg
{
    ($fmt:expr) => ({ eprintln!("{}: {}", env!("CARGO_BIN_NAME"), $fmt); std::process::exit(1); });
    ($fmt:expr, $($arg:tt)*) =>
    ({
        eprintln!("{}: {}", env!("CARGO_BIN_NAME"), format_args!($fmt, $($arg)*));
        std::process::exit(1);
    });
}
