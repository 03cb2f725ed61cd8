use credating::{
    BranchTable, ClockModel, RateSearchOptions, estimate_rate, summarize_branch_table,
};

fn main() {
    // (substitutions, branch duration in years)
    let table = BranchTable::from_rows(&[
        [3.0, 1.2],
        [0.0, 0.3],
        [7.0, 2.9],
        [12.0, 4.1],
        [1.0, 0.6],
        [5.0, 1.8],
    ]);
    let summary = summarize_branch_table(&table);
    println!(
        "{} branches, {:.0} substitutions over {:.1} years",
        summary.n_rows, summary.total_substitutions, summary.total_duration
    );

    let poisson = estimate_rate(&table, ClockModel::Poisson, RateSearchOptions::default())
        .expect("poisson fit");
    println!(
        "poisson: rate {:.4}, log-likelihood {:.4}",
        poisson.rate, poisson.log_likelihood
    );

    let (timed, _) = credating::drop_zero_duration_branches(&table, 0.0);
    let positive = BranchTable::from_rows(
        &timed
            .rows()
            .filter(|&(distance, _)| distance > 0.0)
            .map(|(distance, duration)| [distance, duration])
            .collect::<Vec<_>>(),
    );
    let gamma = estimate_rate(&positive, ClockModel::Gamma, RateSearchOptions::default())
        .expect("gamma fit");
    println!(
        "gamma:   rate {:.4}, log-likelihood {:.4} ({} bisection steps)",
        gamma.rate, gamma.log_likelihood, gamma.iterations
    );
}
