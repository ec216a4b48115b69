//! Decodes every value in a file and prints it as a tree.
//!
//! Usage: `cargo run --example inspect -- <file> [amf0|amf3]`

use std::fs;

use amf::{Decoder, Format, Reader, Value};

fn print_value(value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::String(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                println!("{pad}\"{preview}...\"");
            } else {
                println!("{pad}\"{preview}\"");
            }
        }
        Value::Number(n) => println!("{pad}{n}"),
        Value::Integer(n) => println!("{pad}{n}i"),
        Value::Boolean(b) => println!("{pad}{b}"),
        Value::Null => println!("{pad}null"),
        Value::Undefined => println!("{pad}undefined"),
        Value::Date(ts) => println!("{pad}DATE({ts})"),
        Value::ByteArray(b) => println!("{pad}BYTES[{}]", b.len()),
        Value::Array(items) => {
            println!("{pad}[{}]", items.len());
            for item in items {
                print_value(item, indent + 1);
            }
        }
        Value::Object(obj) => {
            println!("{pad}{{{}}}", obj.len());
            for (name, value) in obj {
                println!("{pad}  {name}:");
                print_value(value, indent + 2);
            }
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: inspect <file> [amf0|amf3]");
        std::process::exit(2);
    };
    let format = match args.next().as_deref() {
        None | Some("amf0") => Format::Amf0,
        Some("amf3") => Format::Amf3,
        Some(other) => {
            eprintln!("unknown format {other:?}");
            std::process::exit(2);
        }
    };

    let data = fs::read(&path).expect("Failed to read file");
    println!("Reading: {} ({} bytes, {})", path, data.len(), format);

    let mut decoder = Decoder::new(Reader::new(&data), format);
    let mut count = 0;
    while !decoder.get_ref().is_empty() {
        let offset = decoder.get_ref().position();
        match decoder.decode() {
            Ok(value) => {
                println!("\n=== Value {count} @ {offset} ({}) ===", value.type_name());
                print_value(&value, 0);
                count += 1;
            }
            Err(e) => {
                eprintln!("\nerror at offset {offset}: {e} [{}]", e.kind().as_str());
                std::process::exit(1);
            }
        }
    }
    println!("\n{count} value(s)");
}
