use std::fs;

const DEFAULT_CONFIG: &str = "src/default_config.toml";
const SECTIONS: &[&str] = &["document", "cover", "images", "table", "alerts"];

fn main() {
    println!("cargo:rerun-if-changed={DEFAULT_CONFIG}");

    let content = fs::read_to_string(DEFAULT_CONFIG)
        .unwrap_or_else(|e| panic!("cannot read {DEFAULT_CONFIG}: {e}"));

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("invalid {DEFAULT_CONFIG}: {e}"),
    };

    // Every section the renderers read must be spelled out in the default.
    for section in SECTIONS {
        if !table.get(*section).is_some_and(toml::Value::is_table) {
            panic!("{DEFAULT_CONFIG} is missing the [{section}] table");
        }
    }
}
