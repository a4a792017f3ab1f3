use std::process::ExitCode;

use mind_engine::{Board, MindState};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::level::LoadedLevel;
use super::occupancy_map::render_occupancy_map;
use super::script::ScriptStep;
use super::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) ticks: usize,
    pub(crate) placed: usize,
    pub(crate) free: usize,
    pub(crate) empty_cells: usize,
}

impl SessionSummary {
    fn from_board(board: &Board, ticks: usize) -> Self {
        let placed = board
            .minds()
            .filter(|mind| mind.state() == MindState::Placed)
            .count();
        Self {
            ticks,
            placed,
            free: board.minds().count() - placed,
            empty_cells: board.empty_cell_count(),
        }
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_session(app) {
        Ok((summary, map)) => {
            info!(
                ticks = summary.ticks,
                placed = summary.placed,
                free = summary.free,
                empty_cells = summary.empty_cells,
                "session_finished"
            );
            print!("{map}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "session_failed");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn report_startup_failure(err: &AppError) -> ExitCode {
    if let AppError::Usage(message) = err {
        eprintln!("{message}");
    }
    error!(error = %err, "startup_failed");
    ExitCode::FAILURE
}

fn run_session(app: AppWiring) -> Result<(SessionSummary, String), AppError> {
    let AppWiring { level, script } = app;
    let mut board = build_board(level)?;
    run_script(&mut board, &script)?;
    let summary = SessionSummary::from_board(&board, script.len());
    Ok((summary, render_occupancy_map(board.grid())))
}

fn build_board(level: LoadedLevel) -> Result<Board, AppError> {
    let mut board = Board::with_sequential_handles(level.grid)?;
    for spawn in level.minds {
        board.spawn_mind(spawn.shape, spawn.position)?;
    }
    info!(
        minds = board.minds().count(),
        placed = board.registry().len(),
        empty_cells = board.empty_cell_count(),
        "board_ready"
    );
    Ok(board)
}

fn run_script(board: &mut Board, steps: &[ScriptStep]) -> Result<(), AppError> {
    for (tick, step) in steps.iter().enumerate() {
        match step {
            ScriptStep::Input(input) => {
                let outcome = board.update(input)?;
                if let Some(mind) = outcome.drag_started {
                    info!(tick, mind = mind.0, "drag_started");
                }
                if outcome.rotated {
                    debug!(tick, "ghost_rotated");
                }
                if let Some((mind, state)) = outcome.drag_ended {
                    info!(tick, mind = mind.0, state = ?state, "drag_ended");
                }
            }
            ScriptStep::Resize { rows, cols } => {
                let report = board.resize(*rows, *cols)?;
                info!(
                    tick,
                    rows,
                    cols,
                    replaced = report.replaced.len(),
                    unplaceable = report.unplaceable.len(),
                    "script_resize_applied"
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::level;
    use crate::app::script;

    fn wiring(script_source: &str) -> AppWiring {
        AppWiring {
            level: level::load_builtin_level().expect("builtin level"),
            script: script::parse_script(script_source).expect("script"),
        }
    }

    #[test]
    fn empty_script_reports_spawn_state() {
        let (summary, map) = run_session(wiring("")).expect("session");
        assert_eq!(
            summary,
            SessionSummary {
                ticks: 0,
                placed: 1,
                free: 4,
                empty_cells: 24,
            }
        );
        assert!(map.starts_with("5x5 grid, 24 empty\n"));
    }

    #[test]
    fn demo_script_ends_with_square_and_centre_cell_placed() {
        let (summary, map) =
            run_session(wiring(include_str!("../../../../assets/scripts/demo.txt")))
                .expect("session");
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.free, 3);
        assert_eq!(summary.empty_cells, 25 - 5);
        assert_eq!(
            map,
            "5x5 grid, 20 empty\n.....\n.....\n..4..\n.22..\n.22..\n"
        );
    }

    #[test]
    fn dragging_onto_the_grid_places_the_mind() {
        let (summary, map) = run_session(wiring("down 10 0\nmove 4 4\nup 4 4")).expect("session");
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.empty_cells, 23);
        assert!(map.contains("....3\n"));
    }

    #[test]
    fn invalid_grid_config_fails_the_session() {
        let mut app = wiring("");
        app.level.grid.cell_size = -1.0;
        assert!(matches!(run_session(app), Err(AppError::Config(_))));
    }
}
