use crate::model::{
    City, MatMulInput, MatMulStep, ProblemInput, QueensInput, QueensMode, QueensStep, SearchInput,
    SearchStep, StepDetail, SudokuInput, SudokuStep, TspInput, TspStep, VisEvent,
};
use crate::orchestrator::{run_controller, UiCommand};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "algoviz",
    version,
    about = "Step-by-step algorithm visualizers with a paced trace output"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pacing speed in milliseconds per step (defaults vary per algorithm)
    #[arg(long, global = true)]
    pub speed_ms: Option<u64>,

    /// Print the final summary as JSON and suppress the step trace
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress the step trace; print only the final summary
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Seed for generated inputs (matrices, cities); random when omitted
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Scan a comma-separated integer list for a target value
    LinearSearch {
        /// Comma-separated integers, e.g. "3, 7, 1, 9"
        #[arg(long)]
        array: String,
        /// Value to search for
        #[arg(long)]
        target: i64,
    },
    /// Multiply two randomly generated square matrices
    Matmul {
        /// Matrix dimension n (result is n x n)
        #[arg(long, default_value_t = 3)]
        size: usize,
    },
    /// Place n queens on an n x n board with backtracking
    Nqueens {
        /// Board size
        #[arg(long, default_value_t = 6)]
        size: usize,
        /// Enumerate every solution instead of stopping at the first
        #[arg(long)]
        find_all: bool,
    },
    /// Solve a built-in or randomly generated Sudoku puzzle with backtracking
    Sudoku {
        /// Puzzle name: easy, medium, hard, empty, or random (uses --seed)
        #[arg(long, default_value = "medium")]
        preset: String,
    },
    /// Brute-force the shortest closed tour over randomly placed cities
    Tsp {
        /// Number of cities (the search is factorial in this)
        #[arg(long, default_value_t = 5)]
        cities: usize,
    },
}

impl Command {
    /// The original animations were tuned per algorithm; keep those defaults.
    fn default_speed_ms(&self) -> u64 {
        match self {
            Command::LinearSearch { .. } => 500,
            Command::Matmul { .. } => 600,
            Command::Nqueens { .. } => 400,
            Command::Sudoku { .. } => 100,
            Command::Tsp { .. } => 300,
        }
    }
}

/// Parse a comma-separated integer list, rejecting malformed tokens.
fn parse_int_list(text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .with_context(|| format!("not an integer: {token:?}"))
        })
        .collect()
}

fn random_matrix(n: usize, rng: &mut StdRng) -> Vec<Vec<i64>> {
    (0..n)
        .map(|_| (0..n).map(|_| rng.gen_range(1..=9)).collect())
        .collect()
}

/// Seed a fresh grid with 25 to 40 random placements, each respecting the
/// row/column/block rule. A placement is abandoned after 100 failed draws.
fn random_sudoku(rng: &mut StdRng) -> [[u8; 9]; 9] {
    let mut grid = [[0u8; 9]; 9];
    let cells_to_fill = rng.gen_range(25..40);
    for _ in 0..cells_to_fill {
        for _ in 0..100 {
            let row = rng.gen_range(0..9);
            let col = rng.gen_range(0..9);
            let digit = rng.gen_range(1..=9u8);
            if grid[row][col] == 0 && digit_fits(&grid, row, col, digit) {
                grid[row][col] = digit;
                break;
            }
        }
    }
    grid
}

fn digit_fits(grid: &[[u8; 9]; 9], row: usize, col: usize, digit: u8) -> bool {
    for i in 0..9 {
        if grid[row][i] == digit || grid[i][col] == digit {
            return false;
        }
    }
    let (block_row, block_col) = (row / 3 * 3, col / 3 * 3);
    for r in block_row..block_row + 3 {
        for c in block_col..block_col + 3 {
            if grid[r][c] == digit {
                return false;
            }
        }
    }
    true
}

/// Uniform city placement in the original's 600x400 field with a 50-unit
/// margin on every side.
fn random_cities(count: usize, rng: &mut StdRng) -> Vec<City> {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 400.0;
    const MARGIN: f64 = 50.0;
    (0..count)
        .map(|_| City {
            x: rng.gen_range(MARGIN..WIDTH - MARGIN),
            y: rng.gen_range(MARGIN..HEIGHT - MARGIN),
        })
        .collect()
}

/// Build the typed problem input from CLI arguments, generating randomized
/// pieces where the subcommand calls for them.
pub fn build_input(args: &Cli) -> Result<ProblemInput> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let input = match &args.command {
        Command::LinearSearch { array, target } => {
            let values = parse_int_list(array)?;
            ProblemInput::Search(SearchInput {
                values,
                target: *target,
            })
        }
        Command::Matmul { size } => {
            if !(1..=8).contains(size) {
                bail!("matrix size must be between 1 and 8");
            }
            ProblemInput::MatMul(MatMulInput {
                a: random_matrix(*size, &mut rng),
                b: random_matrix(*size, &mut rng),
            })
        }
        Command::Nqueens { size, find_all } => {
            if !(1..=12).contains(size) {
                bail!("board size must be between 1 and 12");
            }
            ProblemInput::Queens(QueensInput {
                n: *size,
                mode: if *find_all {
                    QueensMode::FindAll
                } else {
                    QueensMode::FirstSolution
                },
            })
        }
        Command::Sudoku { preset } => {
            let givens = if preset == "random" {
                random_sudoku(&mut rng)
            } else {
                crate::presets::sudoku_preset(preset).with_context(|| {
                    format!(
                        "unknown preset {preset:?}; available: {}, random",
                        crate::presets::PRESET_NAMES.join(", ")
                    )
                })?
            };
            ProblemInput::Sudoku(SudokuInput { givens })
        }
        Command::Tsp { cities } => {
            // (cities - 1)! tours; keep the ceiling where the original kept it.
            if !(3..=8).contains(cities) {
                bail!("city count must be between 3 and 8");
            }
            ProblemInput::Tsp(TspInput {
                cities: random_cities(*cities, &mut rng),
            })
        }
    };

    input.validate()?;
    Ok(input)
}

pub async fn run(args: Cli) -> Result<()> {
    let input = build_input(&args)?;
    let speed_ms = args.speed_ms.unwrap_or_else(|| args.command.default_speed_ms());
    let trace = !args.json && !args.quiet;

    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<VisEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let controller = tokio::spawn(run_controller(input, speed_ms, event_tx, cmd_rx));

    let outcome = loop {
        tokio::select! {
            ev = event_rx.recv() => {
                match ev {
                    Some(VisEvent::RunFinished { outcome }) => break Some(*outcome),
                    Some(ev) => {
                        if trace {
                            if let Some(line) = describe_event(&ev) {
                                let _ = out_tx.send(OutputLine::Stderr(line));
                            }
                        }
                    }
                    None => break None,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = cmd_tx.send(UiCommand::Stop);
            }
        }
    };

    // One-shot mode: the run is over, tell the controller to wind down.
    let _ = cmd_tx.send(UiCommand::Quit);
    drop(cmd_tx);
    controller.await.context("controller task failed")??;

    let outcome = outcome.context("event stream closed without an outcome")?;
    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&outcome)?));
    } else {
        for line in crate::text_summary::build_text_summary(&outcome).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Render one event as a trace line, mirroring the original step banners.
fn describe_event(ev: &VisEvent) -> Option<String> {
    let line = match ev {
        VisEvent::RunStarted { algorithm } => format!("Starting {}...", algorithm.name()),
        VisEvent::Info(msg) => msg.clone(),
        VisEvent::RunFinished { .. } => return None,
        VisEvent::Step(snap) => match &snap.detail {
            StepDetail::Search(step) => describe_search(step, snap.stats.comparisons),
            StepDetail::MatMul(step) => describe_matmul(step)?,
            StepDetail::Queens(step) => describe_queens(step),
            StepDetail::Sudoku(step) => describe_sudoku(step),
            StepDetail::Tsp(step) => describe_tsp(step),
        },
    };
    Some(line)
}

fn describe_search(step: &SearchStep, comparisons: u64) -> String {
    match step {
        SearchStep::Comparing {
            index,
            value,
            target,
        } => format!("Comparing index {index}: {value} vs {target}"),
        SearchStep::Mismatch { index, value } => {
            format!("Index {index}: {value} does not match, continuing")
        }
        SearchStep::Found { index } => {
            format!("Found at index {index} after {comparisons} comparisons")
        }
        SearchStep::NotFound => format!("Not found after {comparisons} comparisons"),
    }
}

fn describe_matmul(step: &MatMulStep) -> Option<String> {
    match step {
        // The cell banner is redundant next to the first accumulate line.
        MatMulStep::CellStarted { .. } => None,
        MatMulStep::Accumulate {
            row,
            col,
            k,
            a,
            b,
            product,
            partial_sum,
        } => Some(format!(
            "C[{row}][{col}] += A[{row}][{k}] * B[{k}][{col}] = {a} * {b} = {product} (sum {partial_sum})"
        )),
        MatMulStep::CellCommitted { row, col, value } => {
            Some(format!("C[{row}][{col}] = {value}"))
        }
    }
}

fn describe_queens(step: &QueensStep) -> String {
    match step {
        QueensStep::Trying { row, col } => format!("Trying queen at ({row}, {col})"),
        QueensStep::Placed { row, col, .. } => format!("Placed queen at ({row}, {col})"),
        QueensStep::Conflict { row, col } => format!("({row}, {col}) is attacked, skipping"),
        QueensStep::Removed { row, col } => format!("Backtracking: removed queen at ({row}, {col})"),
        QueensStep::SolutionFound { ordinal, .. } => format!("Solution {ordinal} found!"),
    }
}

fn describe_sudoku(step: &SudokuStep) -> String {
    match step {
        SudokuStep::Visiting { row, col } => format!("Visiting cell ({row}, {col})"),
        SudokuStep::TryingDigit { row, col, digit } => {
            format!("Trying {digit} at ({row}, {col})")
        }
        SudokuStep::Placed { row, col, digit } => format!("Placed {digit} at ({row}, {col})"),
        SudokuStep::Conflict {
            row,
            col,
            digit,
            conflicts,
        } => format!(
            "{digit} at ({row}, {col}) conflicts with {conflicts:?}"
        ),
        SudokuStep::Backtrack { row, col } => format!("Backtracking from ({row}, {col})"),
    }
}

fn describe_tsp(step: &TspStep) -> String {
    match step {
        TspStep::RouteEvaluated { route, distance } => {
            let path = route
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            format!("Route {path} -> 0: {distance:.2}")
        }
        TspStep::NewBest { distance, .. } => format!("New best tour: {distance:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(command: Command) -> Cli {
        Cli {
            command,
            speed_ms: None,
            json: false,
            quiet: false,
            seed: Some(42),
        }
    }

    #[test]
    fn parses_padded_integer_lists() {
        assert_eq!(parse_int_list("3, 7 ,1,9").unwrap(), vec![3, 7, 1, 9]);
        assert_eq!(parse_int_list("-5").unwrap(), vec![-5]);
        assert!(parse_int_list("1, two, 3").is_err());
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = build_input(&cli(Command::Tsp { cities: 5 })).unwrap();
        let b = build_input(&cli(Command::Tsp { cities: 5 })).unwrap();
        let (ProblemInput::Tsp(a), ProblemInput::Tsp(b)) = (a, b) else {
            panic!("expected tsp inputs");
        };
        for (ca, cb) in a.cities.iter().zip(&b.cities) {
            assert_eq!(ca.x, cb.x);
            assert_eq!(ca.y, cb.y);
        }
    }

    #[test]
    fn generated_matrices_are_square_with_small_entries() {
        let input = build_input(&cli(Command::Matmul { size: 4 })).unwrap();
        let ProblemInput::MatMul(input) = input else {
            panic!("expected matmul input");
        };
        for m in [&input.a, &input.b] {
            assert_eq!(m.len(), 4);
            assert!(m.iter().all(|row| row.len() == 4));
            assert!(m.iter().flatten().all(|&v| (1..=9).contains(&v)));
        }
    }

    #[test]
    fn random_sudoku_puzzles_are_valid_and_reproducible() {
        let a = build_input(&cli(Command::Sudoku {
            preset: "random".into(),
        }))
        .unwrap();
        let b = build_input(&cli(Command::Sudoku {
            preset: "random".into(),
        }))
        .unwrap();
        let (ProblemInput::Sudoku(a), ProblemInput::Sudoku(b)) = (a, b) else {
            panic!("expected sudoku inputs");
        };
        assert_eq!(a.givens, b.givens);

        let filled = a.givens.iter().flatten().filter(|&&c| c != 0).count();
        assert!((20..=39).contains(&filled), "unexpected fill count {filled}");

        // Every given must be legal with respect to the rest of the grid.
        for row in 0..9 {
            for col in 0..9 {
                let digit = a.givens[row][col];
                if digit != 0 {
                    let mut rest = a.givens;
                    rest[row][col] = 0;
                    assert!(digit_fits(&rest, row, col, digit), "illegal given at ({row}, {col})");
                }
            }
        }
    }

    #[test]
    fn out_of_range_sizes_are_rejected() {
        assert!(build_input(&cli(Command::Tsp { cities: 9 })).is_err());
        assert!(build_input(&cli(Command::Matmul { size: 0 })).is_err());
        assert!(build_input(&cli(Command::Nqueens {
            size: 13,
            find_all: false
        }))
        .is_err());
        assert!(build_input(&cli(Command::Sudoku {
            preset: "expert".into()
        }))
        .is_err());
    }

    #[test]
    fn speed_defaults_follow_the_subcommand() {
        assert_eq!(
            Command::Sudoku {
                preset: "easy".into()
            }
            .default_speed_ms(),
            100
        );
        assert_eq!(Command::Tsp { cities: 5 }.default_speed_ms(), 300);
    }
}
