use credating::{CoalescentPrior, NodeTimes, lineage_intervals};

fn main() {
    // sampling years of five isolates and the dates of their ancestors
    let leaves = vec![2019.0, 2019.5, 2020.0, 2016.0, 2018.0];
    let internal = vec![2017.5, 2015.0, 2012.0, 2008.0];
    let times = NodeTimes::from_dates(leaves, internal);

    for interval in lineage_intervals(&times).expect("valid dates") {
        println!(
            "{:>6.2} .. {:>6.2}: {} lineages",
            -interval.start, -interval.end, interval.lineages
        );
    }

    for neg in [0.5, 2.0, 8.0] {
        let prior = CoalescentPrior::new(neg)
            .expect("positive time scale")
            .with_complete_tree(true);
        let value = prior.log_density(&times).expect("compatible dates");
        println!("neg = {neg:>4}: log prior = {value:.4}");
    }
}
