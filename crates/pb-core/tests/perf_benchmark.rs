use pb_core::id::NodeId;
use pb_core::model::{Document, NodeSpec};
use std::time::Instant;

#[test]
#[ignore] // Run manually with `cargo test --test perf_benchmark -- --nocapture --ignored`
fn benchmark_import_and_subtree() {
    // 500 cards, each holding 20 text nodes
    let mut nodes = Vec::with_capacity(10_500);
    for c in 0..500 {
        let card = NodeId::intern(&format!("card{c}"));
        nodes.push(NodeSpec::new("card").into_instance(card, None));
        for t in 0..20 {
            let text = NodeId::intern(&format!("card{c}_text{t}"));
            nodes.push(
                NodeSpec::new("text")
                    .with_prop("content", format!("Item {t}"))
                    .into_instance(text, Some(card)),
            );
        }
    }
    let json = serde_json::to_string(&nodes).expect("encode failed");

    let start = Instant::now();
    let doc = Document::from_json(&json).expect("import failed");
    println!("Imported {} nodes in {:?}", doc.len(), start.elapsed());

    let start = Instant::now();
    let total: usize = doc.roots().map(|r| doc.subtree(r.id).len()).sum();
    println!("Walked {total} subtree entries in {:?}", start.elapsed());
    assert_eq!(total, doc.len());
}
