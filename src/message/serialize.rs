use std::fmt::{self, Write};

use super::Message;

/// Whether a final parameter must be written with a leading `:`.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write a command with arguments directly to a formatter.
/// The last argument is treated as trailing and gets a `:` prefix if needed.
pub(crate) fn write_cmd<S: AsRef<str>>(f: &mut impl Write, cmd: &str, args: &[S]) -> fmt::Result {
    f.write_str(cmd)?;

    let Some((trailing, middle)) = args.split_last() else {
        return Ok(());
    };

    for param in middle {
        f.write_char(' ')?;
        f.write_str(param.as_ref())?;
    }

    f.write_char(' ')?;
    let trailing = trailing.as_ref();
    if needs_colon_prefix(trailing) {
        f.write_char(':')?;
    }
    f.write_str(trailing)
}

/// Write a command whose last argument is always colon-prefixed.
pub(crate) fn write_cmd_freeform<S: AsRef<str>>(
    f: &mut impl Write,
    cmd: &str,
    args: &[S],
) -> fmt::Result {
    match args.split_last() {
        Some((suffix, middle)) => {
            f.write_str(cmd)?;
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg.as_ref())?;
            }
            f.write_str(" :")?;
            f.write_str(suffix.as_ref())
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write_cmd(f, &self.command, &self.params)
    }
}
