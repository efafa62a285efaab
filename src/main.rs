use rowbind::{RecordBinder, RecordDescriptor, TypeTag, SSV};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let source = "
        plain;with spaces;'quoted;separator';when
        'hello;world';   \"123\" ; 1.23 ; 2021-03-04
        true;456;1e10;2021-03-05
    ";

    let binder = RecordBinder::new(&SSV);

    let rows = binder.parse_rows(source)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);

    let descriptor = RecordDescriptor::new()
        .field("plain", TypeTag::String)
        .field_from("count", TypeTag::Integer, "with spaces")
        .field_from("ratio", TypeTag::Float, "quoted;separator")
        .field("when", TypeTag::Date);

    let records = binder.parse_records(source, &descriptor)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
