use std::{fs, path::Path};

use bracket_geometry::prelude::Point;
use tracing::warn;

use crate::error::ScriptError;

/// One tick's worth of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Step(Point),
    Wait,
}

/// Replays player commands from a script, one per tick.
pub struct ScriptedInput {
    script_commands: Vec<PlayerCommand>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&raw))
    }

    pub fn parse(raw: &str) -> Self {
        let mut script_commands = Vec::new();

        for line in raw.lines() {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            for char_code in trimmed_line.chars() {
                if let Some(command) = char_to_command(char_code) {
                    script_commands.push(command);
                } else {
                    warn!(key = %char_code, "unknown key in script");
                }
            }
        }

        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_command(&mut self) -> Option<PlayerCommand> {
        let command = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(command)
    }

    pub fn remaining(&self) -> usize {
        self.script_commands.len() - self.current_command_index
    }
}

fn char_to_command(c: char) -> Option<PlayerCommand> {
    let step = |dx, dy| Some(PlayerCommand::Step(Point::new(dx, dy)));
    match c {
        'w' | 'W' | 'k' | 'K' => step(0, -1),
        'a' | 'A' | 'h' | 'H' => step(-1, 0),
        's' | 'S' | 'j' | 'J' => step(0, 1),
        'd' | 'D' | 'l' | 'L' => step(1, 0),
        '.' => Some(PlayerCommand::Wait),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn skips_comments_blanks_and_unknown_keys() {
        let mut input = ScriptedInput::parse("# opening moves\n\n  dd?.\nK\n");
        assert_eq!(input.remaining(), 4);
        assert_eq!(
            input.next_command(),
            Some(PlayerCommand::Step(Point::new(1, 0)))
        );
        assert_eq!(
            input.next_command(),
            Some(PlayerCommand::Step(Point::new(1, 0)))
        );
        assert_eq!(input.next_command(), Some(PlayerCommand::Wait));
        assert_eq!(
            input.next_command(),
            Some(PlayerCommand::Step(Point::new(0, -1)))
        );
        assert_eq!(input.next_command(), None);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn reads_script_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hjkl").unwrap();
        let mut input = ScriptedInput::from_file(file.path()).unwrap();
        assert_eq!(
            input.next_command(),
            Some(PlayerCommand::Step(Point::new(-1, 0)))
        );
        assert_eq!(input.remaining(), 3);

        assert!(ScriptedInput::from_file("/no/such/script.txt").is_err());
    }
}
