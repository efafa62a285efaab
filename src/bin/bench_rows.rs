use std::env;
use std::time::Instant;

use rowbind::{RecordBinder, RecordDescriptor, TypeTag, CSV};

fn main() {
    let rows: usize = env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(100_000);

    let mut source = String::from("id,name,score,active,joined\n");
    for i in 0..rows {
        source.push_str(&format!(
            "{i}, 'user {i}, jr.', {}.5, {}, 2021-01-{:02}\n",
            i % 100,
            i % 2 == 0,
            i % 28 + 1
        ));
    }

    let descriptor = RecordDescriptor::new()
        .field("id", TypeTag::Integer)
        .field("name", TypeTag::String)
        .field("score", TypeTag::Float)
        .field("active", TypeTag::Boolean)
        .field("joined", TypeTag::Date);
    let binder = RecordBinder::new(&CSV);

    println!("Rows: {}", rows);
    println!("Document size: {:.2} KB", source.len() as f64 / 1024.0);

    let iterations: u32 = 10;
    for (label, parallel) in [("sequential", false), ("parallel", true)] {
        let start = Instant::now();
        for _ in 0..iterations {
            let result = if parallel {
                binder.parse_records_par(&source, &descriptor)
            } else {
                binder.parse_records(&source, &descriptor)
            };
            if let Err(err) = result {
                eprintln!("{label}: {err}");
                std::process::exit(1);
            }
        }
        let duration = start.elapsed();
        let bytes = source.len() as f64 * f64::from(iterations);
        let throughput = bytes / duration.as_secs_f64() / 1_024.0 / 1_024.0;
        println!("{label}: average {:?}, {:.2} MB/s", duration / iterations, throughput);
    }
}
