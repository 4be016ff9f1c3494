use arcaea_scraping::{rating::calc_play_point, schema::Score};
use clap::Parser;

#[derive(Parser)]
struct Opts {
    score: u32,
    /// Chart constant, e.g. `10.5`.
    base_rating: f64,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let res = calc_play_point(Score::from(opts.score), opts.base_rating);
    println!("{:.4}", res.get());
    Ok(())
}
