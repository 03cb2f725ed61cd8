use credating::{ClockModel, poisson_log_likelihood, simulate_substitutions};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    let mut rng = StdRng::seed_from_u64(7);
    let durations: Vec<f64> = (1..=10).map(|i| f64::from(i) * 0.4).collect();
    let table = simulate_substitutions(&durations, 2.5, ClockModel::Poisson, &mut rng)
        .expect("valid rate");

    for (substitutions, duration) in table.rows() {
        println!("{duration:>5.2} years: {substitutions:>3.0} substitutions");
    }
    for rate in [1.5, 2.5, 3.5] {
        let ll = poisson_log_likelihood(&table, rate).expect("valid rate");
        println!("rate {rate}: log-likelihood {ll:.3}");
    }
}
