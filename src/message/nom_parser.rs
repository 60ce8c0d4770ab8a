//! Nom-based IRC line parser.
//!
//! Produces borrowed slices into the decoded line; [`super::Message`] owns
//! the result.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::{context, VerboseError, VerboseErrorKind},
    sequence::preceded,
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_while1(|c| c != ' ')),
    )(input)
}

/// Parse the command token (letters or a numeric reply code).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// Parse a complete IRC line into its components.
///
/// ```text
/// [:prefix] <command> [params...] [:trailing]
/// ```
pub fn parse_message(input: &str) -> ParseResult<&str, ParsedMessage<'_>> {
    let (input, prefix) = context("parsing optional prefix", opt(parse_prefix))(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = context("parsing required command", parse_command)(input)?;

    let mut params: Vec<&str> = Vec::new();
    let mut rest = input;

    loop {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.len() == rest.len() || trimmed.is_empty() {
            rest = trimmed;
            break;
        }
        rest = trimmed;

        if let Some(trailing) = rest.strip_prefix(':') {
            // Trailing parameter: the rest of the line, verbatim.
            params.push(trailing);
            rest = "";
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    Ok((
        rest,
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

/// A parsed IRC line with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command token as it appeared on the wire.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse a trimmed line.
    ///
    /// Anything left over after the parameters, such as a command token
    /// glued to punctuation, makes the whole line malformed.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match parse_message(input) {
            Ok(("", msg)) => Ok(msg),
            Ok((remaining, _)) => Err(MessageParseError::ParseContext {
                position: input.len() - remaining.len(),
                context: "unexpected characters after command".to_owned(),
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let mut position = input.len();
                let mut context_info = "parsing line";
                for (error_input, error_kind) in &e.errors {
                    position = input.len() - error_input.len();
                    if let VerboseErrorKind::Context(ctx) = error_kind {
                        context_info = *ctx;
                    }
                }
                Err(MessageParseError::ParseContext {
                    position,
                    context: context_info.to_owned(),
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_owned(),
            }),
        }
    }
}
