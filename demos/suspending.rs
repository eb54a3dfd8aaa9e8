use conjure::registry::{deferred_source_fn, kind_fn};
use conjure::{iterate, register, Deferred, Options, Value, ValueSource};
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // `slow:ms` yields an increasing counter after sleeping `ms` milliseconds.
    register(
        "slow",
        kind_fn("slow", |_: &Options, args: &[String]| {
            let ms: u64 = args.first().and_then(|a| a.parse().ok()).unwrap_or(10);
            let mut n = 0;
            Ok(Box::new(deferred_source_fn(move || {
                n += 1;
                let value = Value::Int(n);
                Ok(Deferred::pending(async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(value)
                }))
            })) as Box<dyn ValueSource>)
        }),
    );

    let options = Options::new().with_iterations(5);
    let rows = iterate(&["slow:20", "array:(char:A-C):(slow:5)"], &options, |row| {
        println!("settled {}", row);
        Ok::<_, conjure::Error>(row)
    })
    .unwrap()
    .await
    .unwrap();
    println!("{} rows", rows.len());
}
