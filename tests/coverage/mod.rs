// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{BTreeMap, BTreeSet};

use regorus_coverage::*;

use anyhow::{anyhow, bail, Result};
use test_generator::test_resources;

// How a term is written in the yaml cases.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TermSpec {
    // An unbound (unless listed in bindings) variable.
    Var { var: String },
    // The decorated document node at this path.
    Doc { doc: Path },
    // A literal carrying an explicit location.
    At { value: serde_json::Value, file: String },
    // An array term built from other terms.
    Array { array: Vec<TermSpec> },
    Literal(serde_json::Value),
}

#[derive(serde::Deserialize)]
struct CallSpec {
    op: String,
    #[serde(default)]
    args: Vec<TermSpec>,
}

#[derive(serde::Deserialize)]
struct EventSpec {
    unify: Option<Vec<TermSpec>>,
    eval: Option<CallSpec>,
    note: Option<String>,
}

#[derive(serde::Deserialize)]
struct TestCase {
    note: String,
    document: serde_json::Value,
    #[serde(default)]
    bindings: BTreeMap<String, TermSpec>,
    builtins: Option<BTreeSet<String>>,
    events: Vec<EventSpec>,
    covered: Vec<Path>,
    not_covered: Option<Vec<Path>>,
    skip: Option<bool>,
}

#[derive(serde::Deserialize)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn build(term: &TermSpec, document: &Term) -> Result<Term> {
    Ok(match term {
        TermSpec::Var { var } => Term::var(var),
        TermSpec::Doc { doc } => document
            .get_path(doc)
            .cloned()
            .ok_or_else(|| anyhow!("no document node at {doc:?}"))?,
        TermSpec::At { value, file } => Term::from_json_value(value.clone())?
            .with_location(Location::new(file.as_str(), 1, 1)),
        TermSpec::Array { array } => Term::array(
            array
                .iter()
                .map(|s| build(s, document))
                .collect::<Result<Vec<_>>>()?,
        ),
        TermSpec::Literal(v) => Term::from_json_value(v.clone())?,
    })
}

// Substitute bound variables, the way an evaluator resolves terms for tracers.
fn plug(term: &Term, bindings: &BTreeMap<String, Term>) -> Term {
    match &term.value {
        TermValue::Var(v) => bindings.get(&**v).cloned().unwrap_or_else(|| term.clone()),
        TermValue::Array(items) => Term {
            value: TermValue::Array(items.iter().map(|t| plug(t, bindings)).collect()),
            location: term.location.clone(),
        },
        _ => term.clone(),
    }
}

fn run_case(case: &TestCase) -> Result<()> {
    let document = decorate_json(case.document.clone())?;

    let mut bindings = BTreeMap::new();
    for (name, binding) in case.bindings.iter() {
        bindings.insert(name.clone(), build(binding, &document)?);
    }
    let resolver = |t: &Term| plug(t, &bindings);

    let tracer = match &case.builtins {
        Some(names) => CoverageTracer::new().with_builtins(names.clone()),
        None => CoverageTracer::new(),
    };
    assert!(tracer.enabled());
    assert!(!tracer.config().plug_local_vars);

    for event in case.events.iter() {
        if let Some(terms) = &event.unify {
            let [lhs, rhs] = terms.as_slice() else {
                bail!("unify expects two terms");
            };
            let lhs = build(lhs, &document)?;
            let rhs = build(rhs, &document)?;
            tracer.trace_event(&Event::new(
                EventKind::Unify {
                    lhs: &lhs,
                    rhs: &rhs,
                },
                &resolver,
            ));
        }

        if let Some(call) = &event.eval {
            let operands = call
                .args
                .iter()
                .map(|s| build(s, &document))
                .collect::<Result<Vec<_>>>()?;
            let expr = Expr::call(&call.op, operands);
            tracer.trace_event(&Event::new(EventKind::Eval(&expr), &resolver));
        }

        if let Some(note) = &event.note {
            tracer.trace_event(&Event::new(EventKind::Note(note), &resolver));
        }
    }

    let covered: BTreeSet<Path> = tracer.covered().into_iter().collect();
    let expected: BTreeSet<Path> = case.covered.iter().cloned().collect();
    assert_eq!(covered, expected, "covered paths");
    assert_eq!(tracer.covered().len(), expected.len(), "duplicate paths");

    if let Some(not_covered) = &case.not_covered {
        let mut expected = not_covered.clone();
        expected.sort();
        assert_eq!(tracer.report(&document).not_covered, expected, "not covered");
    }

    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in test.cases.iter() {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        run_case(case)?;
        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/coverage/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
