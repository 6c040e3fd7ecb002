//! Line-oriented input: one command per stdin line.

use std::fmt;
use std::str::FromStr;

use foundation::math::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Re-fetch the map catalog.
    Maps,
    Load(String),
    Click(Vec2),
    Hover(Vec2),
    Orbit { dx: f64, dy: f64 },
    Pan { dx: f64, dy: f64 },
    Zoom(f64),
    Resize { width: f64, height: f64 },
    Wireframe,
    /// Ask the server to remove every marker.
    Clear,
    Hud,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    Usage(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(word) => write!(f, "unknown command '{word}'"),
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();
        let cmd = match head.to_ascii_lowercase().as_str() {
            "maps" => Command::Maps,
            "load" => match args.as_slice() {
                [id] => Command::Load((*id).to_string()),
                _ => return Err(CommandError::Usage("load <map-id>")),
            },
            "click" => {
                let [x, y] = numbers(&args, "click <px> <py>")?;
                Command::Click(Vec2::new(x, y))
            }
            "hover" => {
                let [x, y] = numbers(&args, "hover <px> <py>")?;
                Command::Hover(Vec2::new(x, y))
            }
            "orbit" => {
                let [dx, dy] = numbers(&args, "orbit <dx> <dy>")?;
                Command::Orbit { dx, dy }
            }
            "pan" => {
                let [dx, dy] = numbers(&args, "pan <dx> <dy>")?;
                Command::Pan { dx, dy }
            }
            "zoom" => {
                let [delta] = numbers(&args, "zoom <delta>")?;
                Command::Zoom(delta)
            }
            "resize" => {
                let [width, height] = numbers(&args, "resize <width> <height>")?;
                if width <= 0.0 || height <= 0.0 {
                    return Err(CommandError::Usage("resize <width> <height>"));
                }
                Command::Resize { width, height }
            }
            "wireframe" => Command::Wireframe,
            "clear" => Command::Clear,
            "hud" => Command::Hud,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }
}

fn numbers<const N: usize>(args: &[&str], usage: &'static str) -> Result<[f64; N], CommandError> {
    if args.len() != N {
        return Err(CommandError::Usage(usage));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(CommandError::Usage(usage))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError};
    use foundation::math::Vec2;

    #[test]
    fn parses_pointer_and_camera_commands() {
        assert_eq!("click 640 360".parse(), Ok(Command::Click(Vec2::new(640.0, 360.0))));
        assert_eq!("  hover 1.5 2 ".parse(), Ok(Command::Hover(Vec2::new(1.5, 2.0))));
        assert_eq!("orbit -10 4".parse(), Ok(Command::Orbit { dx: -10.0, dy: 4.0 }));
        assert_eq!("zoom 120".parse(), Ok(Command::Zoom(120.0)));
        assert_eq!(
            "resize 800 600".parse(),
            Ok(Command::Resize {
                width: 800.0,
                height: 600.0
            })
        );
    }

    #[test]
    fn parses_bare_words() {
        assert_eq!("load map_2.json".parse(), Ok(Command::Load("map_2.json".to_string())));
        assert_eq!("WIREFRAME".parse(), Ok(Command::Wireframe));
        assert_eq!("exit".parse(), Ok(Command::Quit));
        assert_eq!("maps".parse(), Ok(Command::Maps));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(CommandError::Unknown("jump".to_string()))
        );
        assert!(matches!("click 1".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("zoom NaN".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("resize 0 10".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("load".parse::<Command>(), Err(CommandError::Usage(_))));
    }
}
