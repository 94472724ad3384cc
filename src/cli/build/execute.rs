//! Parallel action execution.
//!
//! Every action runs on a dedicated rayon pool; the coordinator blocks until
//! the whole batch is done. A failing or panicking action only fails its own
//! result.

use rayon::prelude::*;

use crate::action::{Action, ActionResult, ExecContext};
use crate::error::BuildError;
use crate::logger::{ProgressLine, Scope, Style};

/// Run all `actions` on `jobs` worker threads and log their results.
///
/// Results come back in action order. With `quiet`, the progress line and
/// successful results are not printed.
pub fn execute(
    actions: &[Action],
    ctx: &ExecContext<'_>,
    jobs: usize,
    quiet: bool,
) -> Result<Vec<ActionResult>, BuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("sitebuilder-{i}"))
        .build()?;

    crate::debug!("build"; "running {} actions on {} threads", actions.len(), pool.current_num_threads());

    let progress = (!quiet).then(|| ProgressLine::new(&[("actions", actions.len())]));

    let results: Vec<ActionResult> = pool.install(|| {
        actions
            .par_iter()
            .map(|action| {
                let result = action.run(ctx);
                if let Some(p) = &progress {
                    p.inc("actions");
                }
                result
            })
            .collect()
    });

    if let Some(p) = progress {
        p.finish();
    }

    for result in &results {
        if !quiet || !result.success() {
            log_result(result);
        }
    }

    Ok(results)
}

/// `  OK src/a.md -> build/a/index.html`, then each warning line.
fn log_result(result: &ActionResult) {
    Scope::root().line(&result.to_string());
    let warnings = Scope::root().nested("     ↪ ").styled(Style::Yellow);
    for warning in result.warnings() {
        warnings.lines(warning);
    }
}
