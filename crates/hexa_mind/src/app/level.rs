use std::collections::HashSet;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use mind_engine::{GridConfig, GridCoord, MindShape, Vec2};
use serde::Deserialize;
use thiserror::Error;

pub(crate) const LEVEL_VERSION: u32 = 1;

const BUILTIN_LEVEL_JSON: &str = include_str!("../../../../assets/levels/starter.json");

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("read level '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse level json{}: {message}", at_path(.path))]
    Parse { path: String, message: String },
    #[error("level validation failed at {path}: {message}")]
    Validation { path: String, message: String },
}

fn at_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else {
        format!(" at {path}")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelDef {
    level_version: u32,
    #[serde(default)]
    grid: GridConfig,
    #[serde(default)]
    minds: Vec<MindDef>,
}

/// Shape offsets are authored with rows growing downward.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MindDef {
    shape: Vec<[i32; 2]>,
    position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MindSpawn {
    pub(crate) shape: MindShape,
    pub(crate) position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoadedLevel {
    pub(crate) grid: GridConfig,
    pub(crate) minds: Vec<MindSpawn>,
}

pub(crate) fn load_level_file(path: &Path) -> Result<LoadedLevel, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&raw)
}

pub(crate) fn load_builtin_level() -> Result<LoadedLevel, LevelError> {
    parse_level(BUILTIN_LEVEL_JSON)
}

pub(crate) fn parse_level(raw: &str) -> Result<LoadedLevel, LevelError> {
    let def = parse_level_json(raw)?;
    validate_level(&def)?;
    into_loaded(def)
}

fn parse_level_json(raw: &str) -> Result<LevelDef, LevelError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LevelDef>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        LevelError::Parse {
            path,
            message: error.into_inner().to_string(),
        }
    })
}

fn validation_err(path: impl Into<String>, message: impl Into<String>) -> LevelError {
    LevelError::Validation {
        path: path.into(),
        message: message.into(),
    }
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> LevelError {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

fn validate_level(def: &LevelDef) -> Result<(), LevelError> {
    if def.level_version != LEVEL_VERSION {
        return Err(expected_actual(
            "level_version",
            LEVEL_VERSION,
            def.level_version,
        ));
    }
    def.grid
        .validate()
        .map_err(|error| validation_err("grid.cell_size", error.to_string()))?;

    for (index, mind) in def.minds.iter().enumerate() {
        if mind.shape.is_empty() {
            return Err(validation_err(
                format!("minds[{index}].shape"),
                "shape needs at least one cell",
            ));
        }
        let mut seen = HashSet::with_capacity(mind.shape.len());
        for (cell_index, offset) in mind.shape.iter().enumerate() {
            if offset[1] == i32::MIN {
                return Err(validation_err(
                    format!("minds[{index}].shape[{cell_index}]"),
                    format!("row offset {} cannot be flipped", offset[1]),
                ));
            }
            if !seen.insert(*offset) {
                return Err(validation_err(
                    format!("minds[{index}].shape[{cell_index}]"),
                    format!("duplicate offset [{}, {}]", offset[0], offset[1]),
                ));
            }
        }
        if !mind.position.iter().all(|value| value.is_finite()) {
            return Err(validation_err(
                format!("minds[{index}].position"),
                "position must be finite",
            ));
        }
    }
    Ok(())
}

fn into_loaded(def: LevelDef) -> Result<LoadedLevel, LevelError> {
    let minds = def
        .minds
        .into_iter()
        .enumerate()
        .map(|(index, mind)| -> Result<MindSpawn, LevelError> {
            let offsets = mind
                .shape
                .iter()
                .enumerate()
                .map(|(cell_index, [x, y])| -> Result<GridCoord, LevelError> {
                    let row = y.checked_neg().ok_or_else(|| {
                        validation_err(
                            format!("minds[{index}].shape[{cell_index}]"),
                            format!("row offset {y} cannot be flipped"),
                        )
                    })?;
                    Ok(GridCoord::new(*x, row))
                })
                .collect::<Result<Vec<_>, LevelError>>()?;
            let shape = MindShape::new(offsets).map_err(|error| {
                validation_err(format!("minds[{index}].shape"), error.to_string())
            })?;
            Ok(MindSpawn {
                shape,
                position: Vec2::new(mind.position[0], mind.position[1]),
            })
        })
        .collect::<Result<Vec<_>, LevelError>>()?;

    Ok(LoadedLevel {
        grid: def.grid,
        minds,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mind_engine::{DEFAULT_CELL_SIZE, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn builtin_level_parses_and_validates() {
        let level = load_builtin_level().expect("builtin level");
        assert_eq!(level.grid, GridConfig::default());
        assert_eq!(level.minds.len(), 5);
    }

    #[test]
    fn shape_rows_are_flipped_to_y_up() {
        let level = parse_level(
            r#"{"level_version":1,"minds":[{"shape":[[0,0],[0,1],[1,1]],"position":[3.0,2.0]}]}"#,
        )
        .expect("parse");
        let spawn = &level.minds[0];
        assert_eq!(
            spawn.shape.offsets(),
            &[
                GridCoord::new(0, 0),
                GridCoord::new(0, -1),
                GridCoord::new(1, -1)
            ]
        );
        assert_eq!(spawn.position, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn missing_grid_falls_back_to_defaults() {
        let level = parse_level(r#"{"level_version":1}"#).expect("parse");
        assert_eq!(level.grid.rows, DEFAULT_GRID_ROWS);
        assert_eq!(level.grid.cols, DEFAULT_GRID_COLS);
        assert_eq!(level.grid.cell_size, DEFAULT_CELL_SIZE);
        assert!(level.minds.is_empty());
    }

    #[test]
    fn parse_reports_missing_required_field() {
        let error = parse_level(r#"{"grid":{"rows":3}}"#).expect_err("missing version");
        let message = error.to_string();
        assert!(message.contains("parse level json"));
        assert!(message.contains("level_version"));
        assert!(message.contains("missing field"));
    }

    #[test]
    fn parse_reports_nested_type_mismatch_path() {
        let error = parse_level(
            r#"{"level_version":1,"minds":[{"shape":[[0,0]],"position":["a",0.0]}]}"#,
        )
        .expect_err("type mismatch");
        let message = error.to_string();
        assert!(message.contains("parse level json at minds[0].position"));
    }

    #[test]
    fn parse_rejects_unknown_grid_field() {
        let error = parse_level(r#"{"level_version":1,"grid":{"depth":2}}"#)
            .expect_err("unknown field");
        assert!(error.to_string().contains("unknown field `depth`"));
    }

    #[test]
    fn validation_rejects_wrong_version() {
        let error = parse_level(r#"{"level_version":9}"#).expect_err("bad version");
        assert_eq!(
            error.to_string(),
            "level validation failed at level_version: expected 1, got 9"
        );
    }

    #[test]
    fn validation_rejects_bad_cell_size() {
        let error = parse_level(r#"{"level_version":1,"grid":{"cell_size":0.0}}"#)
            .expect_err("bad cell size");
        assert!(error
            .to_string()
            .starts_with("level validation failed at grid.cell_size"));
    }

    #[test]
    fn validation_rejects_empty_and_duplicate_shapes() {
        let error = parse_level(r#"{"level_version":1,"minds":[{"shape":[],"position":[0,0]}]}"#)
            .expect_err("empty shape");
        assert!(error.to_string().contains("minds[0].shape"));

        let error = parse_level(
            r#"{"level_version":1,"minds":[
                {"shape":[[0,0]],"position":[0,0]},
                {"shape":[[0,0],[1,0],[0,0]],"position":[0,0]}
            ]}"#,
        )
        .expect_err("duplicate offset");
        assert!(error.to_string().contains("minds[1].shape[2]"));
        assert!(error.to_string().contains("duplicate offset [0, 0]"));
    }

    #[test]
    fn validation_rejects_a_row_offset_that_cannot_be_flipped() {
        let error = parse_level(
            r#"{"level_version":1,"minds":[{"shape":[[0,0],[0,-2147483648]],"position":[0,0]}]}"#,
        )
        .expect_err("unflippable row");
        assert_eq!(
            error.to_string(),
            "level validation failed at minds[0].shape[1]: \
             row offset -2147483648 cannot be flipped"
        );
    }

    #[test]
    fn loading_reports_shape_errors_instead_of_dropping_minds() {
        let def = LevelDef {
            level_version: LEVEL_VERSION,
            grid: GridConfig::default(),
            minds: vec![
                MindDef {
                    shape: vec![[0, 0]],
                    position: [0.0, 0.0],
                },
                MindDef {
                    shape: Vec::new(),
                    position: [1.0, 1.0],
                },
            ],
        };
        let error = into_loaded(def).expect_err("empty shape");
        assert!(error.to_string().contains("minds[1].shape"));
        assert!(error.to_string().contains("at least one cell"));
    }

    #[test]
    fn level_file_loads_from_disk() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("level.json");
        fs::write(
            &path,
            r#"{"level_version":1,"grid":{"rows":3,"cols":4,"cell_size":2.0},
               "minds":[{"shape":[[0,0]],"position":[2.0,2.0]}]}"#,
        )
        .expect("write level");

        let level = load_level_file(&path).expect("load");
        assert_eq!(level.grid.rows, 3);
        assert_eq!(level.grid.cols, 4);
        assert_eq!(level.grid.cell_size, 2.0);
        assert_eq!(level.minds.len(), 1);
    }

    #[test]
    fn missing_level_file_reports_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("absent.json");
        let error = load_level_file(&path).expect_err("missing file");
        assert!(matches!(error, LevelError::Read { .. }));
        assert!(error.to_string().contains("absent.json"));
    }
}
