use crate::support::{Config, parse_tree_or_exit, print_json};
use cotree_kernel::{canonicalize, canonicalize_labeled, key_of};
use serde_json::json;

pub fn run(tree: String, labels: bool, json_output: bool, config: &Config) {
    let parsed = parse_tree_or_exit(&tree);
    let labels = config.labels(labels);
    let info = if labels {
        canonicalize_labeled(&parsed, &|label: &String| label.clone())
    } else {
        canonicalize(&parsed)
    };

    if json_output {
        print_json(&json!({
            "tree": key_of(&parsed),
            "labels": labels,
            "nodes": parsed.size(),
            "height": parsed.height(),
            "code": info.code,
            "aut": info.aut.to_string(),
        }));
    } else {
        println!("cotree canon {}", key_of(&parsed));
        println!("  Nodes: {}", parsed.size());
        println!("  Code: {}", info.code);
        println!("  |Aut|: {}", info.aut);
    }
}
