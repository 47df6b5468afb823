use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "cotree",
    about = "Cotree: admissible cuts, tree symmetry and semiring-weighted coproducts",
    version
)]
pub struct Cli {
    /// Verbosity (-d info, -dd debug, -ddd trace); logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// TOML file with defaults for mode, semiring and labels
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Canonical code and automorphism count of a tree
    Canon {
        /// Tree in `f(g(x,y),z)` notation
        tree: String,

        /// Fold labels into the canonical code
        #[arg(long)]
        labels: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enumerate admissible cuts in deterministic order
    Cuts {
        /// Tree in `f(g(x,y),z)` notation
        tree: String,

        /// Stop after this many cuts
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate the weighted coproduct of a tree
    Delta {
        /// Tree in `f(g(x,y),z)` notation
        tree: String,

        /// Symmetry mode: planar, symmetric-agg, or symmetric-orbit
        #[arg(long)]
        mode: Option<String>,

        /// Coefficient semiring
        #[arg(long, value_enum)]
        semiring: Option<SemiringKind>,

        /// Fold labels into canonical keys (symmetric modes)
        #[arg(long)]
        labels: bool,

        /// Write NDJSON records to this path (`-` for stdout)
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemiringKind {
    /// Natural numbers
    Nat,
    /// Arbitrary-precision integers
    Int,
    /// Exact rationals (required for symmetric-orbit)
    Rat,
}

impl std::fmt::Display for SemiringKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nat => write!(f, "nat"),
            Self::Int => write!(f, "int"),
            Self::Rat => write!(f, "rat"),
        }
    }
}
