//! Runs a set of expressions a fixed number of times.

use crate::error::{BoxError, Error, ErrorRepr};
use crate::{Deferred, Draw, GeneratorNode, Options, Value};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::future::{self, FutureExt};
use log::trace;
use std::future::IntoFuture;

/// Builds one node per expression and calls `callback` `options.iterations`
/// times with a fresh draw from each.
///
/// With one expression the callback gets its value directly; with several it
/// gets a [`Value::Array`] in expression order. The callback results are
/// returned in iteration order.
///
/// When every node is synchronous the draws and callbacks interleave, the
/// first error is returned as `Err`, and the result is [`Deferred::Ready`].
/// Otherwise every draw is issued up front and the result is a
/// [`Deferred::Pending`] that runs the callback as draws settle, in
/// completion order, and fails with the first error. A draw that fails
/// outright in this mode also fails the pending result, not the call.
///
/// ```
/// use conjure::{iterate, Options};
///
/// let options = Options::new().with_iterations(3);
/// let lengths = iterate(&["string:4-4", "int:1-1"], &options, |row| {
///     Ok::<_, conjure::Error>(row.to_string().len())
/// })
/// .unwrap()
/// .wait()
/// .unwrap();
/// assert_eq!(lengths, [6, 6, 6]);
/// ```
pub fn iterate<F, R, E>(
    expressions: &[&str],
    options: &Options,
    mut callback: F,
) -> Result<Deferred<Vec<R>>, Error>
where
    F: FnMut(Value) -> Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: Into<BoxError>,
{
    if expressions.is_empty() {
        return Err(Error(ErrorRepr::Argument("no generator expressions given")));
    }
    if options.iterations == 0 {
        return Err(Error(ErrorRepr::Argument("iterations must be positive")));
    }

    let mut nodes = expressions
        .iter()
        .map(|e| GeneratorNode::new(e, options))
        .collect::<Result<Vec<_>, _>>()?;
    let asynchronous = nodes.iter().any(GeneratorNode::is_async);
    trace!(
        "iterating {} expression(s) {} times (async: {})",
        nodes.len(),
        options.iterations,
        asynchronous
    );

    let mut results: Vec<Option<R>> = Vec::with_capacity(options.iterations);
    let mut pending = FuturesUnordered::new();
    for i in 0..options.iterations {
        let (row, failed) = match draw_row(&mut nodes) {
            Ok(row) => (row, false),
            // rejects the aggregate rather than failing the call
            Err(e) if asynchronous => (Deferred::pending(future::ready(Err(e))), true),
            Err(e) => return Err(e),
        };
        match row {
            Deferred::Ready(row) if !asynchronous && pending.is_empty() => {
                results.push(Some(callback(row).map_err(Error::custom)?));
            }
            row => {
                results.push(None);
                pending.push(row.into_future().map(move |r| (i, r)));
            }
        }
        if failed {
            trace!("draw {} failed, no further draws issued", i);
            break;
        }
    }

    if pending.is_empty() {
        return Ok(Deferred::Ready(results.into_iter().flatten().collect()));
    }
    trace!("{} draws pending", pending.len());

    Ok(Deferred::pending(async move {
        while let Some((i, row)) = pending.next().await {
            let r = callback(row?).map_err(Error::custom)?;
            results[i] = Some(r);
        }
        Ok::<_, Error>(results.into_iter().flatten().collect())
    }))
}

/// One draw from every node, combined into the callback's argument.
fn draw_row(nodes: &mut [GeneratorNode]) -> Result<Draw, Error> {
    if let [node] = nodes {
        return node.resolve();
    }
    let draws = nodes
        .iter_mut()
        .map(GeneratorNode::resolve)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Deferred::all(draws).map(Value::Array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{deferred_source_fn, kind_fn, register, ValueSource};
    use crate::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(calls: &Arc<AtomicUsize>) -> impl FnMut(Value) -> Result<Value, Error> {
        let calls = calls.clone();
        move |v| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(v)
        }
    }

    #[test]
    fn sync_runs_every_iteration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let options = Options::new().with_iterations(50);
        let result = iterate(&["int:1-5"], &options, counting(&calls)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 50);

        let values = result.into_ready().unwrap();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| (1..=5).contains(&v.as_i64().unwrap())));
    }

    #[test]
    fn default_iterations() {
        let calls = Arc::new(AtomicUsize::new(0));
        iterate(&["boolean"], &Options::default(), counting(&calls)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn several_expressions_in_order() {
        let options = Options::new().with_iterations(10);
        let rows = iterate(&["int:1-1", "char:B-B", "\"x\""], &options, Ok::<_, Error>)
            .unwrap()
            .wait()
            .unwrap();
        for row in rows {
            assert_eq!(
                row,
                Value::Array(vec![Value::Int(1), Value::from("B"), Value::from("x")])
            );
        }
    }

    #[test]
    fn boundary_errors() {
        let e = iterate(&[], &Options::default(), Ok::<_, Error>).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Argument);

        let options = Options::new().with_iterations(0);
        let e = iterate(&["int"], &options, Ok::<_, Error>).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Argument);
    }

    #[test]
    fn construction_errors_come_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let e = iterate(&["int", "driver_test_missing"], &Options::default(), counting(&calls))
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::GeneratorNotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let e = iterate(&["entry:nothing"], &Options::default(), counting(&calls)).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::CollectionNotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sync_callback_error_stops_iteration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let e = iterate(&["int"], &Options::default(), move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 4 {
                return Err("fifth call failed");
            }
            Ok(())
        })
        .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Custom);
        assert_eq!(e.to_string(), "fifth call failed");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn async_nodes_defer_the_callbacks() {
        register(
            "driver_test_later",
            kind_fn("driver_test_later", |_: &Options, _: &[String]| {
                Ok(Box::new(deferred_source_fn(|| {
                    Ok(Deferred::pending(async { Ok(Value::Int(7)) }))
                })) as Box<dyn ValueSource>)
            }),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let options = Options::new().with_iterations(20);
        let result = iterate(&["driver_test_later", "int:2-2"], &options, counting(&calls)).unwrap();
        assert!(!result.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let rows = result.wait().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        assert_eq!(rows.len(), 20);
        for row in rows {
            assert_eq!(row, Value::from(vec![7, 2]));
        }
    }

    #[test]
    fn async_draw_errors_reject_the_aggregate() {
        let draws = Arc::new(AtomicUsize::new(0));
        let counter = draws.clone();
        register(
            "driver_test_refuses_draw",
            kind_fn("driver_test_refuses_draw", move |_: &Options, _: &[String]| {
                let counter = counter.clone();
                Ok(Box::new(deferred_source_fn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::custom("draw refused"))
                })) as Box<dyn ValueSource>)
            }),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let result = iterate(
            &["int:1-2", "driver_test_refuses_draw"],
            &Options::default(),
            counting(&calls),
        )
        .unwrap();
        assert!(!result.is_ready());
        assert_eq!(draws.load(Ordering::SeqCst), 1);

        let e = result.wait().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Custom);
        assert_eq!(e.to_string(), "draw refused");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn async_errors_reject() {
        register(
            "driver_test_broken",
            kind_fn("driver_test_broken", |_: &Options, _: &[String]| {
                Ok(Box::new(deferred_source_fn(|| {
                    Ok(Deferred::pending(async { Err(Error::custom("draw failed")) }))
                })) as Box<dyn ValueSource>)
            }),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let result = iterate(&["driver_test_broken"], &Options::default(), counting(&calls)).unwrap();
        assert_eq!(result.wait().unwrap_err().to_string(), "draw failed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
