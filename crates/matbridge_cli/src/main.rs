//! Matbridge CLI
//!
//! Exact integer matrix operations from the command line.
//!
//! # Usage
//! ```bash
//! # Determinant and rank
//! matbridge det --matrix a.txt
//! matbridge rank --matrix a.txt
//!
//! # Exact solve: A·C = d·B
//! matbridge solve --matrix a.txt --rhs b.txt
//!
//! # Hermite normal form without trailing zero rows
//! matbridge hnf --matrix a.txt --drop-zero-rows
//! ```
//!
//! Matrix files are one row per line, whitespace-separated integers; an
//! empty file is the 0x0 matrix.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigInt;
use tracing::info;

use matbridge_core::{
    eigen_decompose, hermite_form, rank, right_kernel, Determinant, EliminationEngine, HnfOptions,
    InterruptFlag, Matrix, Solver,
};

#[derive(Parser)]
#[command(name = "matbridge")]
#[command(about = "Exact integer matrix kernels with interruptible dispatch")]
#[command(version)]
struct Cli {
    /// Cancel after this many engine checkpoints (cooperative timeout).
    #[arg(long, global = true)]
    budget: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exact determinant
    Det {
        #[arg(long)]
        matrix: PathBuf,
    },

    /// Exact rank
    Rank {
        #[arg(long)]
        matrix: PathBuf,
    },

    /// Basis of the right kernel
    Nullspace {
        #[arg(long)]
        matrix: PathBuf,
    },

    /// Hermite normal form
    Hnf {
        #[arg(long)]
        matrix: PathBuf,

        /// Drop trailing all-zero rows
        #[arg(long)]
        drop_zero_rows: bool,
    },

    /// Solve A·C = d·B (or C·A = d·B with --left)
    Solve {
        #[arg(long)]
        matrix: PathBuf,

        #[arg(long)]
        rhs: PathBuf,

        /// Solve on the left instead
        #[arg(long)]
        left: bool,
    },

    /// Inverse up to a denominator: A·B = d·I
    Invert {
        #[arg(long)]
        matrix: PathBuf,
    },

    /// Exact eigen-decomposition
    Eigen {
        #[arg(long)]
        matrix: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let flag = match cli.budget {
        Some(n) => InterruptFlag::with_budget(n),
        None => InterruptFlag::new(),
    };
    let engine = EliminationEngine::new();

    match cli.command {
        Commands::Det { matrix } => {
            let a = read_matrix(&matrix)?;
            let det = Determinant::with_interrupt(&engine, flag).compute(&a)?;
            println!("{det}");
        }
        Commands::Rank { matrix } => {
            let a = read_matrix(&matrix)?;
            println!("{}", rank(&a, &flag)?);
        }
        Commands::Nullspace { matrix } => {
            let a = read_matrix(&matrix)?;
            let k = right_kernel(&a, &flag)?;
            info!(dim = k.cols(), "kernel computed");
            print_matrix(&k);
        }
        Commands::Hnf {
            matrix,
            drop_zero_rows,
        } => {
            let a = read_matrix(&matrix)?;
            let opts = HnfOptions {
                include_zero_rows: !drop_zero_rows,
            };
            print_matrix(&hermite_form(&a, opts, &flag)?);
        }
        Commands::Solve { matrix, rhs, left } => {
            let a = read_matrix(&matrix)?;
            let b = read_matrix(&rhs)?;
            let solver = Solver::with_interrupt(&engine, flag);
            let (c, d) = if left {
                solver.solve_left(&a, &b)?
            } else {
                solver.solve_right(&a, &b)?
            };
            println!("denominator: {d}");
            print_matrix(&c);
        }
        Commands::Invert { matrix } => {
            let a = read_matrix(&matrix)?;
            let (b, d) = Solver::with_interrupt(&engine, flag).invert(&a)?;
            println!("denominator: {d}");
            print_matrix(&b);
        }
        Commands::Eigen { matrix } => {
            let a = read_matrix(&matrix)?;
            let decomposition = eigen_decompose(&a, &flag)?;
            for pair in &decomposition.pairs {
                println!(
                    "eigenvalue {} (multiplicity {}, eigenspace dim {}):",
                    pair.value,
                    pair.multiplicity,
                    pair.vectors.cols()
                );
                print_matrix(&pair.vectors);
            }
        }
    }

    Ok(())
}

/// Parse a whitespace/line matrix file.
fn read_matrix(path: &Path) -> Result<Matrix<BigInt>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading matrix from {}", path.display()))?;

    let mut rows: Vec<Vec<BigInt>> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value = BigInt::from_str(token).with_context(|| {
                format!("{}:{}: bad integer '{token}'", path.display(), lineno + 1)
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if let Some(first) = rows.first() {
        let cols = first.len();
        if rows.iter().any(|r| r.len() != cols) {
            bail!("{}: rows have inconsistent lengths", path.display());
        }
    }

    Ok(Matrix::from_rows(&rows)?)
}

fn print_matrix(m: &Matrix<BigInt>) {
    if m.is_empty() {
        println!("({}x{} empty matrix)", m.rows(), m.cols());
        return;
    }
    for i in 0..m.rows() {
        let row: Vec<String> = m.row(i).iter().map(ToString::to_string).collect();
        println!("{}", row.join(" "));
    }
}
