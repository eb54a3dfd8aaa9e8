use conjure::{iterate, GeneratorNode, Options};

fn main() {
    let options = Options::from_json(
        r#"{ "letters": "ACGT", "collection": ["alpha", "beta", "gamma"] }"#,
    )
    .unwrap();

    for expression in [
        "string:8-12",
        "number:0-100:0.01",
        "3*(int:0-9)",
        "A-F",
        "oneOf:(boolean):(\"none\")",
        "array:(entry):(int:1-3):(string:(char:X-Z))",
        r#"literal:{"id"}"#,
    ] {
        match GeneratorNode::new(expression, &options) {
            Ok(mut node) => {
                let value = node.resolve().unwrap().wait().unwrap();
                println!("{:<48} {}", expression, value);
            }
            Err(e) => println!("{:<48} error: {}", expression, e),
        }
    }

    // A table of rows, one per iteration.
    let options = options.with_iterations(5);
    let rows = iterate(&["int:1-1000", "string:4-6", "boolean:0.2"], &options, |row| {
        Ok::<_, conjure::Error>(row.to_string())
    })
    .unwrap()
    .wait()
    .unwrap();
    for row in rows {
        println!("{}", row);
    }
}
