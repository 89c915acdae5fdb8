use super::types::SourceLine;
use crate::error::InputError;

/// One command typed at the debugger prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Next,
    Continue,
    Break(SourceLine),
    Delete(SourceLine),
    ListBreakpoints,
    Stack,
    Heap(usize),
    ScrollUp,
    ScrollDown,
    Top,
    End,
    Clear,
    Info,
    Help,
    Quit,
    /// Blank input.
    Nothing,
}

pub const HELP: &str = "Commands: (r)un, (n)ext, (c)ontinue, (b)reak <line>, (d)elete <line>, \
(l)ist, (s)tack, (v)iew <addr>, k/j scroll, g/G top/end, (w)ipe, (i)nfo, (h)elp, (q)uit. \
Press Enter while the program runs to interrupt it";

fn argument<'a>(name: &str, args: &'a [String]) -> Result<&'a str, InputError> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| InputError::MissingArgument(name.to_string()))
}

fn parse_line(text: &str) -> Result<SourceLine, InputError> {
    text.parse::<SourceLine>()
        .map_err(|_| InputError::InvalidLine(text.to_string()))
}

fn parse_address(text: &str) -> Result<usize, InputError> {
    text.parse::<usize>()
        .map_err(|_| InputError::InvalidAddress(text.to_string()))
}

/// Parse a prompt line. Words are split shell-style so quoting works the way
/// users expect; only the first word selects the command.
pub fn parse_command(input: &str) -> Result<Command, InputError> {
    let words = shlex::split(input.trim()).ok_or(InputError::Unbalanced)?;
    let Some((name, args)) = words.split_first() else {
        return Ok(Command::Nothing);
    };

    let cmd = match name.as_str() {
        "r" | "run" => Command::Run,
        "n" | "next" => Command::Next,
        "c" | "continue" => Command::Continue,
        "b" | "break" => Command::Break(parse_line(argument(name, args)?)?),
        "d" | "delete" => Command::Delete(parse_line(argument(name, args)?)?),
        "l" | "list" => Command::ListBreakpoints,
        "s" | "stack" => Command::Stack,
        "v" | "view" => Command::Heap(parse_address(argument(name, args)?)?),
        "k" | "up" => Command::ScrollUp,
        "j" | "down" => Command::ScrollDown,
        "g" | "top" => Command::Top,
        "G" | "end" => Command::End,
        "w" | "wipe" => Command::Clear,
        "i" | "info" => Command::Info,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!(parse_command("r"), Ok(Command::Run));
        assert_eq!(parse_command("  continue "), Ok(Command::Continue));
        assert_eq!(parse_command("b 12"), Ok(Command::Break(12)));
        assert_eq!(parse_command("view \"40\""), Ok(Command::Heap(40)));
        assert_eq!(parse_command("G"), Ok(Command::End));
        assert_eq!(parse_command(""), Ok(Command::Nothing));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(
            parse_command("b twelve"),
            Err(InputError::InvalidLine("twelve".to_string()))
        );
        assert_eq!(
            parse_command("v -3"),
            Err(InputError::InvalidAddress("-3".to_string()))
        );
        assert_eq!(
            parse_command("b"),
            Err(InputError::MissingArgument("b".to_string()))
        );
        assert_eq!(parse_command("b \"4"), Err(InputError::Unbalanced));
        assert_eq!(
            parse_command("x"),
            Err(InputError::UnknownCommand("x".to_string()))
        );
    }
}
