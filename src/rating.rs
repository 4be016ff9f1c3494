use derive_more::{From, Into};
use serde::{Deserialize, Serialize};

use crate::schema::{ChartConstant, Score};

#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, From, Into, Serialize, Deserialize)]
pub struct PlayPoint(f64);

impl PlayPoint {
    pub fn get(self) -> f64 {
        self.0
    }
}

pub fn calc_play_point(score: Score, base_rating: f64) -> PlayPoint {
    let ret = match score.get() {
        10_000_000.. => base_rating + 2.,
        s @ 9_800_000.. => base_rating + 1. + (s - 9_800_000) as f64 / 200_000.,
        s => (base_rating + (s as f64 - 9_500_000.) / 300_000.).max(0.),
    };
    ret.into()
}

pub fn play_point_for_chart(score: Score, constant: ChartConstant) -> PlayPoint {
    calc_play_point(score, constant.get())
}
