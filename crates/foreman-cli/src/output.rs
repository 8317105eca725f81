use foreman_core::executor::ExecutionResult;

/// Print one line per outcome, then the tree listing when present.
pub fn print_result(result: &ExecutionResult) {
    for outcome in &result.outcomes {
        println!("  - {outcome}");
    }
    if let Some(listing) = &result.listing {
        print!("{listing}");
    }
}
