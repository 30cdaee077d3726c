use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LOCALE: &str = "de";

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let locales_dir = manifest_dir.join("locales");
    println!("cargo:rerun-if-changed={}", locales_dir.display());

    let mut locales = BTreeMap::<String, BTreeMap<String, String>>::new();
    let entries = fs::read_dir(&locales_dir)
        .unwrap_or_else(|error| panic!("reading {}: {error}", locales_dir.display()));
    for entry in entries {
        let path = entry.expect("locale dir entry").path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        println!("cargo:rerun-if-changed={}", path.display());
        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        locales.insert(locale.to_string(), load_catalog(&path));
    }

    let mut output = String::new();
    writeln!(output, "pub const DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};").expect("write");
    writeln!(output, "pub static LOCALES: &[(&str, &[(&str, &str)])] = &[").expect("write");
    for (locale, entries) in &locales {
        writeln!(output, "    ({locale:?}, &[").expect("write");
        for (key, value) in entries {
            writeln!(output, "        ({key:?}, {value:?}),").expect("write");
        }
        writeln!(output, "    ]),").expect("write");
    }
    writeln!(output, "];").expect("write");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    fs::write(out_dir.join("calmpage_i18n_generated.rs"), output)
        .expect("writing generated i18n catalog");
}

fn load_catalog(path: &Path) -> BTreeMap<String, String> {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("reading {}: {error}", path.display()));
    let table: toml::Table = toml::from_str(&text)
        .unwrap_or_else(|error| panic!("parsing {}: {error}", path.display()));
    let mut entries = BTreeMap::new();
    flatten("", &table, &mut entries);
    entries
}

fn flatten(prefix: &str, table: &toml::Table, entries: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                entries.insert(full_key, text.clone());
            }
            toml::Value::Table(nested) => flatten(&full_key, nested, entries),
            other => panic!("locale key {full_key} must be a string, found {other}"),
        }
    }
}
