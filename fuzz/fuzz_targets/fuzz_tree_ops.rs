#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use dashkit_core::{TreeNode, check_invariants};
use dashkit_runtime::{SpecialNode, TreeClient};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

#[derive(Debug, Arbitrary)]
enum Op {
    Append { parent: u8, leaf: bool },
    Remove { target: u8 },
    SetProp { target: u8, value: i16 },
    Toggle { target: u8 },
    Select { target: u8 },
    ClearSelected,
    Drop { active: u8, over: u8, offset: i16 },
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }
    let client = TreeClient::new(Some(TreeNode::root()));
    let cascades = Rc::new(Cell::new(0usize));
    let _watch = {
        let cascades = Rc::clone(&cascades);
        client.watch_tree(move |_| cascades.set(cascades.get() + 1))
    };

    let pick = |n: u8| {
        let flat = client.flatten();
        flat[n as usize % flat.len()].id().to_string()
    };

    let mut applied = 0usize;
    for (step, op) in ops.into_iter().enumerate() {
        let changed = match op {
            Op::Append { parent, leaf } => {
                let id = format!("n{step}");
                let child = if leaf { TreeNode::leaf(id) } else { TreeNode::container(id) };
                client.add_child_to_node(&pick(parent), child).unwrap_or(false)
            }
            Op::Remove { target } => client.remove_node(&pick(target)),
            Op::SetProp { target, value } => {
                client.set_node_property(&pick(target), "value", |_| Some(json!(value)))
            }
            Op::Toggle { target } => client.toggle_collapsed(&pick(target)),
            Op::Select { target } => client.set_special(SpecialNode::Selected, &pick(target)),
            Op::ClearSelected => client.clear_special(&SpecialNode::Selected),
            Op::Drop { active, over, offset } => {
                client.commit_drop(&pick(active), &pick(over), f64::from(offset))
            }
        };
        if changed {
            applied += 1;
        }

        let root = client.root().expect("client never loses its root");
        assert_eq!(root.id, "root", "root anchor replaced");
        assert!(check_invariants(&root).is_clean(), "edit broke tree invariants");
        if let Some(selected) = client.special(&SpecialNode::Selected) {
            assert!(client.contains(&selected), "selection points at a removed node");
        }
    }
    assert_eq!(cascades.get(), applied, "cascade count differs from applied edits");
});
