use crate::cli::SemiringKind;
use crate::support::{Config, parse_tree_or_exit, print_json};
use cotree_kernel::{
    DeltaMode, DeltaOptions, Integer, Natural, Rationals, Semiring, Tree, delta, key_of,
};
use cotree_store::{
    StoreError, records, records_digest, write_records, write_records_to_path,
};
use serde_json::json;
use std::fmt::Display;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct Args {
    pub tree: String,
    pub mode: Option<String>,
    pub semiring: Option<SemiringKind>,
    pub labels: bool,
    pub out: Option<String>,
    pub json: bool,
}

struct Resolved<'a> {
    tree: &'a Tree<String>,
    mode: DeltaMode,
    kind: SemiringKind,
    labels: bool,
    out: Option<&'a str>,
    json: bool,
}

pub fn run(args: Args, config: &Config) {
    let tree = parse_tree_or_exit(&args.tree);
    let mode = config.mode(args.mode.as_deref());
    let kind = config.semiring(args.semiring, mode);
    let resolved = Resolved {
        tree: &tree,
        mode,
        kind,
        labels: config.labels(args.labels),
        out: args.out.as_deref(),
        json: args.json,
    };
    tracing::info!(%mode, semiring = %kind, labels = resolved.labels, "delta");

    match kind {
        SemiringKind::Nat => run_with(&Natural, &resolved),
        SemiringKind::Int => run_with(&Integer, &resolved),
        SemiringKind::Rat => run_with(&Rationals, &resolved),
    }
}

fn run_with<S>(semiring: &S, r: &Resolved<'_>)
where
    S: Semiring,
    S::Elem: Display,
{
    let options = DeltaOptions::default().label_sensitive(r.labels);
    let result = delta(r.tree, semiring, r.mode, &options).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let rows = records(&result);
    let total = result.total(semiring);

    let digest = match r.out {
        Some("-") => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            let written = write_records(&mut lock, &rows).and_then(|digest| {
                lock.flush().map_err(|source| StoreError::Io {
                    target: "<stdout>".into(),
                    source,
                })?;
                Ok(digest)
            });
            if let Err(e) = written {
                eprintln!("error: failed to write records: {e}");
                std::process::exit(1);
            }
            // Stdout carries the records only.
            return;
        }
        Some(path) => write_records_to_path(path, &rows),
        None => records_digest(&rows),
    }
    .unwrap_or_else(|e| {
        eprintln!("error: failed to export records: {e}");
        std::process::exit(1);
    });

    if r.json {
        print_json(&json!({
            "tree": key_of(r.tree),
            "mode": r.mode,
            "semiring": r.kind.to_string(),
            "labels": r.labels,
            "cuts": result.cuts_seen(),
            "term_count": rows.len(),
            "total": total.to_string(),
            "digest": digest,
            "out": r.out,
            "terms": rows,
        }));
    } else {
        println!(
            "cotree delta {} --mode {} --semiring {}",
            key_of(r.tree),
            r.mode,
            r.kind
        );
        println!("  Cuts: {}", result.cuts_seen());
        println!("  Terms: {}", rows.len());
        println!("  Total: {total}");
        println!("  Digest: {digest}");
        if let Some(path) = r.out {
            println!("  Written: {path}");
        }
        for row in &rows {
            println!(
                "  {}  [{}] ⊗ {}",
                row.coefficient,
                row.forest.join(", "),
                row.trunk
            );
        }
    }
}
