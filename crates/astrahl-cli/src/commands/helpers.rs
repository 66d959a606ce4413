// Shared helpers for command handlers: JSON input files keyed by wire name,
// backend selection and JSON output.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use astrahl_model::{Expression, FaultTree, Wire, WireOrder};
use astrahl_solver::{
    Problem, ProcessSolver, ProcessSolverConfig, ReferencePropagator, SaHyperParams, Solver,
    SolverBackend,
};
use miette::{miette, Context, IntoDiagnostic};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::{ConfidenceArgs, SaArgs, SolverArgs, REFERENCE_SOLVER};

pub(crate) type DynBackend = Box<dyn SolverBackend + Send + Sync>;

pub(crate) fn read_json(path: &Path) -> miette::Result<Value> {
    let raw = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .into_diagnostic()
        .wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

pub(crate) fn load_tree(path: &Path) -> miette::Result<FaultTree> {
    FaultTree::from_json(&read_json(path)?)
        .into_diagnostic()
        .wrap_err_with(|| format!("{} is not a fault tree", path.display()))
}

/// Re-key a name-keyed object onto the wires of `order`.
pub(crate) fn wire_map<T: DeserializeOwned>(
    order: &WireOrder,
    value: Value,
    what: &str,
) -> miette::Result<BTreeMap<Wire, T>> {
    let by_name: BTreeMap<String, T> = serde_json::from_value(value)
        .into_diagnostic()
        .wrap_err_with(|| format!("{what} must be an object keyed by wire name"))?;
    by_name
        .into_iter()
        .map(|(name, v)| {
            let wire = order
                .find(&name)
                .ok_or_else(|| miette!("{what} names `{name}`, which is not a wire of the tree"))?;
            Ok((wire.clone(), v))
        })
        .collect()
}

pub(crate) fn load_wire_map<T: DeserializeOwned>(
    order: &WireOrder,
    path: &Path,
    what: &str,
) -> miette::Result<BTreeMap<Wire, T>> {
    wire_map(order, read_json(path)?, what)
}

/// Load a JSON array of name-keyed objects.
pub(crate) fn load_wire_rows<T: DeserializeOwned>(
    order: &WireOrder,
    path: &Path,
    what: &str,
) -> miette::Result<Vec<BTreeMap<Wire, T>>> {
    let rows = match read_json(path)? {
        Value::Array(rows) => rows,
        _ => return Err(miette!("{what} must be a JSON array")),
    };
    rows.into_iter()
        .map(|row| wire_map(order, row, what))
        .collect()
}

/// Wires named by a free-standing object, with no tree to check against.
pub(crate) fn load_named_point(path: &Path) -> miette::Result<BTreeMap<Wire, f64>> {
    let by_name: BTreeMap<String, f64> = serde_json::from_value(read_json(path)?)
        .into_diagnostic()
        .wrap_err("point must be an object mapping wire names to numbers")?;
    Ok(by_name
        .into_iter()
        .map(|(name, value)| (Wire::new(name), value))
        .collect())
}

pub(crate) fn build_backend(args: &SolverArgs) -> DynBackend {
    if args.executable == REFERENCE_SOLVER {
        debug!("using in-process reference propagator");
        return Box::new(ReferencePropagator);
    }
    debug!(executable = %args.executable, "using external solver");
    Box::new(ProcessSolver::new(ProcessSolverConfig {
        executable: args.executable.clone().into(),
        scratch_dir: args.scratch_dir.clone(),
        cleanup: !args.keep_files,
    }))
}

/// Problem over `tree` with confidence functions from `--confidence`, or the
/// geometric default for every wire.
pub(crate) fn build_problem(tree: FaultTree, args: &ConfidenceArgs) -> miette::Result<Problem> {
    let Some(path) = &args.file else {
        return Problem::uniform(tree, Expression::geometric_confidence(args.confidence_base))
            .into_diagnostic();
    };
    let order = WireOrder::of(&tree);
    let encoded: BTreeMap<Wire, Value> = load_wire_map(&order, path, "confidence file")?;
    let mut functions = BTreeMap::new();
    for (wire, value) in encoded {
        let function = Expression::from_json(&value)
            .into_diagnostic()
            .wrap_err_with(|| format!("confidence function for `{wire}`"))?;
        functions.insert(wire, function);
    }
    Problem::new(tree, functions).into_diagnostic()
}

pub(crate) fn solver_for(
    tree: FaultTree,
    confidence: Option<&ConfidenceArgs>,
    args: &SolverArgs,
) -> miette::Result<Solver<DynBackend>> {
    let problem = match confidence {
        Some(confidence) => build_problem(tree, confidence)?,
        None => Problem::without_confidence(tree).into_diagnostic()?,
    };
    Ok(Solver::new(problem, build_backend(args)))
}

pub(crate) fn sa_params(args: &SaArgs) -> SaHyperParams {
    SaHyperParams {
        max_step: args.max_step,
        p_init: args.p_init,
        lambda: args.lambda,
        function_constant: args.function_constant,
        ..SaHyperParams::default()
    }
}

/// Name-keyed JSON object in wire order.
pub(crate) fn wire_object<T: Into<Value> + Copy>(values: &BTreeMap<Wire, T>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(wire, v)| (wire.name().to_string(), (*v).into()))
            .collect::<Map<_, _>>(),
    )
}

pub(crate) fn print_json(value: &Value) -> miette::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}
