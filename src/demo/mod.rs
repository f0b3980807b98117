//! Demo driver used by the `lambdacalc` binary
//!
//! Not part of the evaluator's contract: this layer only calls the public
//! operations of [`Evaluator`] and reports what they return. Two workloads
//! exist:
//! - [`Workload::Fold`]: fold the numeral table, then a handful of powers,
//!   sums and products
//! - [`Workload::SelfPower`]: time `Nk^Nk`; `N9^N9` is the expensive one

pub mod report;

use crate::interpreter::engine::Evaluator;
use crate::logging::targets;
use crate::memory::Backend;
use report::Reporter;
use std::io::{self, Write};
use std::time::Instant;

/// Which computation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workload {
    #[default]
    Fold,
    /// `Nk^Nk` for the given `k`
    SelfPower(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOptions {
    pub workload: Workload,
    pub numeral_count: usize,
    pub repeat: usize,
    pub stats: bool,
}

/// Run a workload on `eval`, writing results to `reporter`
pub fn run<B: Backend, W: Write>(
    eval: &Evaluator<B>,
    options: &DemoOptions,
    reporter: &mut Reporter<W>,
) -> io::Result<()> {
    reporter.heading(&format!("Lambda Calc Demo (backend: {})", B::KIND))?;

    match options.workload {
        Workload::Fold => fold_demo(eval, options.numeral_count, reporter)?,
        Workload::SelfPower(k) => self_power_demo(eval, k, options.repeat, reporter)?,
    }

    if options.stats {
        reporter.stats(&eval.stats())?;
    }
    reporter.flush()
}

fn fold_demo<B: Backend, W: Write>(
    eval: &Evaluator<B>,
    count: usize,
    reporter: &mut Reporter<W>,
) -> io::Result<()> {
    let table = eval.numerals(count);
    log::debug!(target: targets::DEMO, "Built {} numerals", table.len());

    for (i, n) in table.iter().enumerate() {
        reporter.result(&format!("(num#{} inc 0)", i), eval.fold(n))?;
    }

    // Table entries are reused when the table is long enough
    let n = |k: usize| table.get(k).cloned().unwrap_or_else(|| eval.numeral(k));

    reporter.result("N2^N3", eval.pow(&n(2), &n(3)))?;
    reporter.result("N3^N2", eval.pow(&n(3), &n(2)))?;
    reporter.result("N5^N2", eval.pow(&n(5), &n(2)))?;
    reporter.result("N2^N5", eval.pow(&n(2), &n(5)))?;
    reporter.result("N9+N5", eval.fold(&eval.plus(&n(9), &n(5))))?;
    reporter.result("N9*N5", eval.fold(&eval.mul(&n(9), &n(5))))?;
    Ok(())
}

fn self_power_demo<B: Backend, W: Write>(
    eval: &Evaluator<B>,
    k: usize,
    repeat: usize,
    reporter: &mut Reporter<W>,
) -> io::Result<()> {
    let n = eval.numeral(k);
    let label = format!("N{k}^N{k}");

    for attempt in 0..repeat {
        let start = Instant::now();
        let result = eval.pow(&n, &n);
        let elapsed = start.elapsed();
        log::info!(
            target: targets::DEMO,
            "Attempt #{attempt} finished in {:?} with {} live closures",
            elapsed,
            eval.stats().live()
        );

        if repeat > 1 {
            reporter.result(&format!("Attempt #{} {}", attempt, label), result)?;
        } else {
            reporter.result(&label, result)?;
        }
        reporter.timing(elapsed.as_nanos())?;
    }
    Ok(())
}
