//! Line-based input scripts.
//!
//! ```text
//! # comments and blank lines are ignored
//! connect
//! press char_a        # touch-down on an on-screen control
//! wait 1000
//! release char_a
//! tap enter 50        # press, hold 50 ms, release
//! key 29 shift        # physical KEYCODE_A with Shift held
//! keyup 29
//! disconnect
//! unregistered        # the stack drops the profile registration
//! ```

use std::str::FromStr;
use std::time::Duration;

use btkb_core::MetaState;
use thiserror::Error;

/// Error type for script parsing and execution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` needs {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: {value:?} is not a number")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: unknown modifier flag {flag:?}")]
    UnknownFlag { line: usize, flag: String },

    #[error("line {line}: unexpected trailing argument {value:?}")]
    TrailingArgument { line: usize, value: String },

    #[error("line {line}: no control named {name:?} in the active layout")]
    UnknownControl { line: usize, name: String },
}

/// One script instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Press(String),
    Release(String),
    Tap(String, Duration),
    KeyDown { keycode: u32, meta: MetaState },
    KeyUp(u32),
    Wait(Duration),
    Connect,
    Disconnect,
    AppUnregistered,
}

/// A command with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut lines = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            lines.push(ScriptLine {
                line,
                command: parse_line(line, content)?,
            });
        }
        Ok(Script { lines })
    }
}

fn parse_line(line: usize, content: &str) -> Result<ScriptCommand, ScriptError> {
    let mut words = content.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ScriptError::UnknownCommand {
            line,
            command: String::new(),
        });
    };

    let parsed = match command {
        "press" => ScriptCommand::Press(word(line, &mut words, "press", "a control name")?),
        "release" => ScriptCommand::Release(word(line, &mut words, "release", "a control name")?),
        "tap" => {
            let name = word(line, &mut words, "tap", "a control name")?;
            let ms = number(line, &mut words, "tap", "a hold time in ms")?;
            ScriptCommand::Tap(name, Duration::from_millis(ms))
        }
        "key" => {
            let keycode = number(line, &mut words, "key", "a keycode")?;
            let keycode = u32::try_from(keycode).map_err(|_| ScriptError::InvalidNumber {
                line,
                value: keycode.to_string(),
            })?;
            let mut meta = MetaState::NONE;
            for flag in words.by_ref() {
                meta = meta | parse_flag(line, flag)?;
            }
            ScriptCommand::KeyDown { keycode, meta }
        }
        "keyup" => {
            let keycode = number(line, &mut words, "keyup", "a keycode")?;
            let keycode = u32::try_from(keycode).map_err(|_| ScriptError::InvalidNumber {
                line,
                value: keycode.to_string(),
            })?;
            ScriptCommand::KeyUp(keycode)
        }
        "wait" => ScriptCommand::Wait(Duration::from_millis(number(
            line,
            &mut words,
            "wait",
            "a duration in ms",
        )?)),
        "connect" => ScriptCommand::Connect,
        "disconnect" => ScriptCommand::Disconnect,
        "unregistered" => ScriptCommand::AppUnregistered,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };

    if let Some(extra) = words.next() {
        return Err(ScriptError::TrailingArgument {
            line,
            value: extra.to_string(),
        });
    }
    Ok(parsed)
}

fn word<'a>(
    line: usize,
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<String, ScriptError> {
    words
        .next()
        .map(str::to_string)
        .ok_or(ScriptError::MissingArgument {
            line,
            command,
            expected,
        })
}

fn number<'a>(
    line: usize,
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<u64, ScriptError> {
    let value = word(line, words, command, expected)?;
    value
        .parse()
        .map_err(|_| ScriptError::InvalidNumber { line, value })
}

fn parse_flag(line: usize, flag: &str) -> Result<MetaState, ScriptError> {
    match flag {
        "shift" => Ok(MetaState::SHIFT_ON),
        "ctrl" => Ok(MetaState::CTRL_ON),
        "alt" => Ok(MetaState::ALT_ON),
        "sym" => Ok(MetaState::SYM_ON),
        "meta" => Ok(MetaState::META_ON),
        other => Err(ScriptError::UnknownFlag {
            line,
            flag: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_command() {
        // Arrange
        let text = "\
            # warm-up\n\
            connect\n\
            press char_a\n\
            wait 1000\n\
            release char_a   # trailing comment\n\
            tap enter 50\n\
            key 29 shift ctrl\n\
            keyup 29\n\
            \n\
            disconnect\n\
            unregistered\n";

        // Act
        let script: Script = text.parse().expect("script must parse");

        // Assert
        let commands: Vec<_> = script.lines.iter().map(|l| l.command.clone()).collect();
        assert_eq!(
            commands,
            vec![
                ScriptCommand::Connect,
                ScriptCommand::Press("char_a".to_string()),
                ScriptCommand::Wait(Duration::from_millis(1000)),
                ScriptCommand::Release("char_a".to_string()),
                ScriptCommand::Tap("enter".to_string(), Duration::from_millis(50)),
                ScriptCommand::KeyDown {
                    keycode: 29,
                    meta: MetaState::SHIFT_ON | MetaState::CTRL_ON,
                },
                ScriptCommand::KeyUp(29),
                ScriptCommand::Disconnect,
                ScriptCommand::AppUnregistered,
            ]
        );
        assert_eq!(script.lines[1].line, 3);
    }

    #[test]
    fn test_unknown_command_reports_its_line() {
        let err = "connect\njump 3".parse::<Script>().unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                line: 2,
                command: "jump".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_and_bad_arguments() {
        assert!(matches!(
            "press".parse::<Script>(),
            Err(ScriptError::MissingArgument { command: "press", .. })
        ));
        assert!(matches!(
            "wait soon".parse::<Script>(),
            Err(ScriptError::InvalidNumber { .. })
        ));
        assert!(matches!(
            "key 29 hyper".parse::<Script>(),
            Err(ScriptError::UnknownFlag { .. })
        ));
        assert!(matches!(
            "connect now".parse::<Script>(),
            Err(ScriptError::TrailingArgument { .. })
        ));
    }

    #[test]
    fn test_plain_key_has_empty_meta() {
        let script: Script = "key 62".parse().expect("script must parse");
        assert_eq!(
            script.lines[0].command,
            ScriptCommand::KeyDown {
                keycode: 62,
                meta: MetaState::NONE,
            }
        );
    }
}
