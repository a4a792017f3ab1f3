use std::fs;
use std::path::{Path, PathBuf};

use mind_engine::{InputSnapshot, Vec2};
use thiserror::Error;

/// One scripted tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ScriptStep {
    Input(InputSnapshot),
    Resize { rows: u32, cols: u32 },
}

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("read script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("script line {line}: {reason} (usage: {usage})")]
    Parse {
        line: usize,
        reason: String,
        usage: &'static str,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct StepParseError {
    reason: String,
    usage: &'static str,
}

const POINTER_USAGE: &str = "down|move|up <x:f32> <y:f32>";
const RESIZE_USAGE: &str = "resize <rows:u32> <cols:u32>";

pub(crate) fn load_script_file(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&raw)
}

/// Blank lines and `#` comments produce no tick.
pub(crate) fn parse_script(raw: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = parse_step(line).map_err(|error| ScriptError::Parse {
            line: index + 1,
            reason: error.reason,
            usage: error.usage,
        })?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<ScriptStep, StepParseError> {
    let mut tokens = line.split_whitespace();
    let Some(command) = tokens.next() else {
        return Err(StepParseError {
            reason: "empty step".to_string(),
            usage: "down|move|up|rotate|resize|idle",
        });
    };
    let args = tokens.collect::<Vec<_>>();

    match command.to_ascii_lowercase().as_str() {
        "down" => {
            let pointer = parse_point(&args)?;
            Ok(ScriptStep::Input(
                InputSnapshot::empty()
                    .with_pointer_world(Some(pointer))
                    .with_pointer_pressed(true),
            ))
        }
        "move" => {
            let pointer = parse_point(&args)?;
            Ok(ScriptStep::Input(
                InputSnapshot::empty().with_pointer_world(Some(pointer)),
            ))
        }
        "up" => {
            let pointer = parse_point(&args)?;
            Ok(ScriptStep::Input(
                InputSnapshot::empty()
                    .with_pointer_world(Some(pointer))
                    .with_pointer_released(true),
            ))
        }
        "rotate" => {
            require_no_args(&args, "rotate")?;
            Ok(ScriptStep::Input(
                InputSnapshot::empty().with_rotate_pressed(true),
            ))
        }
        "idle" => {
            require_no_args(&args, "idle")?;
            Ok(ScriptStep::Input(InputSnapshot::empty()))
        }
        "resize" => parse_resize(&args),
        other => Err(StepParseError {
            reason: format!("unknown step '{other}'"),
            usage: "down|move|up|rotate|resize|idle",
        }),
    }
}

fn parse_point(args: &[&str]) -> Result<Vec2, StepParseError> {
    let [x, y] = args else {
        return Err(StepParseError {
            reason: "expected exactly two coordinates".to_string(),
            usage: POINTER_USAGE,
        });
    };
    let x = parse_coordinate(x, "x")?;
    let y = parse_coordinate(y, "y")?;
    Ok(Vec2::new(x, y))
}

fn parse_coordinate(raw: &str, axis: &str) -> Result<f32, StepParseError> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| StepParseError {
            reason: format!("invalid {axis} coordinate '{raw}' (expected f32)"),
            usage: POINTER_USAGE,
        })
}

fn parse_resize(args: &[&str]) -> Result<ScriptStep, StepParseError> {
    let [rows, cols] = args else {
        return Err(StepParseError {
            reason: "expected <rows> <cols>".to_string(),
            usage: RESIZE_USAGE,
        });
    };
    let rows = rows.parse::<u32>().map_err(|_| StepParseError {
        reason: format!("invalid rows '{rows}' (expected u32)"),
        usage: RESIZE_USAGE,
    })?;
    let cols = cols.parse::<u32>().map_err(|_| StepParseError {
        reason: format!("invalid cols '{cols}' (expected u32)"),
        usage: RESIZE_USAGE,
    })?;
    Ok(ScriptStep::Resize { rows, cols })
}

fn require_no_args(args: &[&str], usage: &'static str) -> Result<(), StepParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(StepParseError {
            reason: "unexpected extra arguments".to_string(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn pointer_steps_set_the_matching_edge() {
        let steps = parse_script("down 1 2\nmove 1.5 -2\nup 3 4").expect("parse");
        assert_eq!(
            steps,
            vec![
                ScriptStep::Input(
                    InputSnapshot::empty()
                        .with_pointer_world(Some(Vec2::new(1.0, 2.0)))
                        .with_pointer_pressed(true)
                ),
                ScriptStep::Input(
                    InputSnapshot::empty().with_pointer_world(Some(Vec2::new(1.5, -2.0)))
                ),
                ScriptStep::Input(
                    InputSnapshot::empty()
                        .with_pointer_world(Some(Vec2::new(3.0, 4.0)))
                        .with_pointer_released(true)
                ),
            ]
        );
    }

    #[test]
    fn rotate_idle_and_resize_parse() {
        let steps = parse_script("ROTATE\nidle\nresize 3 4").expect("parse");
        assert_eq!(
            steps,
            vec![
                ScriptStep::Input(InputSnapshot::empty().with_rotate_pressed(true)),
                ScriptStep::Input(InputSnapshot::empty()),
                ScriptStep::Resize { rows: 3, cols: 4 },
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let steps = parse_script("# setup\n\n   \nidle\n  # trailing").expect("parse");
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn errors_carry_the_source_line_number() {
        let error = parse_script("idle\n# note\nmove 1").expect_err("short move");
        let message = error.to_string();
        assert!(message.starts_with("script line 3: expected exactly two coordinates"));
        assert!(message.contains(POINTER_USAGE));
    }

    #[test]
    fn bad_values_are_rejected() {
        let error = parse_script("down x 1").expect_err("bad x");
        assert!(error.to_string().contains("invalid x coordinate 'x'"));

        let error = parse_script("move 1 NaN").expect_err("non-finite y");
        assert!(error.to_string().contains("invalid y coordinate 'NaN'"));

        let error = parse_script("resize -1 3").expect_err("negative rows");
        assert!(error.to_string().contains("invalid rows '-1'"));

        let error = parse_script("rotate now").expect_err("extra args");
        assert!(error.to_string().contains("unexpected extra arguments"));

        let error = parse_script("jump 1 1").expect_err("unknown step");
        assert!(error.to_string().contains("unknown step 'jump'"));
    }

    #[test]
    fn script_file_loads_from_disk() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("steps.txt");
        fs::write(&path, "down 0 0\nup 0 0\n").expect("write script");

        let steps = load_script_file(&path).expect("load");
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn bundled_demo_script_parses() {
        let steps = parse_script(include_str!("../../../../assets/scripts/demo.txt"))
            .expect("demo script");
        assert!(steps
            .iter()
            .any(|step| matches!(step, ScriptStep::Resize { rows: 3, cols: 3 })));
    }
}
