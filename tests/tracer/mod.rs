// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(feature = "arc")]
use std::collections::BTreeSet;
#[cfg(feature = "arc")]
use std::sync::Arc;
#[cfg(feature = "arc")]
use std::thread;

use regorus_coverage::*;

use anyhow::Result;

#[cfg(feature = "arc")]
fn identity(t: &Term) -> Term {
    t.clone()
}

#[cfg(feature = "arc")]
#[test]
fn shared_between_workers() -> Result<()> {
    let document = Arc::new(decorate_json(serde_json::json!({
        "items": (0..64).map(|i| serde_json::json!({"id": i})).collect::<Vec<_>>()
    }))?);
    let tracer = Arc::new(CoverageTracer::new());

    let workers: Vec<_> = (0..4u64)
        .map(|w| {
            let document = document.clone();
            let tracer = tracer.clone();
            thread::spawn(move || {
                for i in (w..64).step_by(4) {
                    let path: Path = [
                        PathSegment::from("items"),
                        PathSegment::from(i),
                        PathSegment::from("id"),
                    ]
                    .into_iter()
                    .collect();
                    if let Some(id) = document.get_path(&path) {
                        let expr = Expr::call("gt", vec![id.clone(), Term::number(10u64)]);
                        tracer.trace_event(&Event::new(EventKind::Eval(&expr), &identity));
                    }
                }
            })
        })
        .collect();

    for w in workers {
        w.join().map_err(|_| anyhow::anyhow!("worker panicked"))?;
    }

    let covered: BTreeSet<Path> = tracer.covered().into_iter().collect();
    assert_eq!(covered.len(), 64);
    assert!(covered.contains(&Path::from_json_str(r#"["items", 63, "id"]"#)?));
    assert!(tracer.report(&document).is_fully_covered());
    Ok(())
}

#[test]
fn report_after_run() -> Result<()> {
    let document = decorate_json(serde_json::json!({"a": [1, 2], "b": "x"}))?;
    let tracer = CoverageTracer::new();

    let a1 = document
        .get_path(&Path::from_json_str(r#"["a", 1]"#)?)
        .cloned()
        .unwrap_or_else(Term::null);
    let b = document
        .get_path(&Path::from_json_str(r#"["b"]"#)?)
        .cloned()
        .unwrap_or_else(Term::null);

    let lhs = Term::var("x");
    let resolve = move |t: &Term| match &t.value {
        TermValue::Var(_) => a1.clone(),
        _ => t.clone(),
    };
    tracer.trace_event(&Event::new(EventKind::Unify { lhs: &lhs, rhs: &b }, &resolve));

    let report = tracer.report(&document);
    assert_eq!(
        report.covered,
        vec![
            Path::from_json_str(r#"["a", 1]"#)?,
            Path::from_json_str(r#"["b"]"#)?
        ]
    );
    assert_eq!(report.not_covered, vec![Path::from_json_str(r#"["a", 0]"#)?]);

    tracer.clear();
    assert_eq!(tracer.covered(), vec![Path::root()]);
    assert!(tracer.report(&document).covered.is_empty());
    Ok(())
}

#[test]
fn encode_failures_surface() {
    let err = encode_segments(&[serde_json::json!("a"), serde_json::json!(null)]);
    assert!(matches!(err, Err(CoverageError::UnsupportedSegment { .. })));
}
