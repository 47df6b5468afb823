use crate::support::{parse_tree_or_exit, print_json};
use cotree_kernel::{cut_count, key_forest, key_of};
use num_bigint::BigUint;
use serde_json::json;

pub fn run(tree: String, limit: Option<usize>, json_output: bool) {
    let parsed = parse_tree_or_exit(&tree);
    let total = cut_count(&parsed);
    let limit = limit.unwrap_or(usize::MAX);

    // Pull only as many cuts as will be shown.
    let shown: Vec<(String, String)> = parsed
        .cuts()
        .take(limit)
        .map(|(forest, trunk)| (key_forest(&forest), key_of(&trunk)))
        .collect();
    let truncated = total > BigUint::from(shown.len());
    tracing::debug!(shown = shown.len(), %total, truncated, "enumerated cuts");

    if json_output {
        let cuts: Vec<_> = shown
            .iter()
            .map(|(forest, trunk)| json!({ "forest": forest, "trunk": trunk }))
            .collect();
        print_json(&json!({
            "tree": key_of(&parsed),
            "cut_count": total.to_string(),
            "cuts": cuts,
            "truncated": truncated,
        }));
    } else {
        println!("cotree cuts {}", key_of(&parsed));
        println!("  Admissible cuts: {total}");
        for (forest, trunk) in &shown {
            println!("  {forest} | {trunk}");
        }
        if truncated {
            println!("  ... ({} shown)", shown.len());
        }
    }
}
