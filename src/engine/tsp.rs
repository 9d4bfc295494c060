use crate::control::Pace;
use crate::engine::StepCtx;
use crate::model::{City, Outcome, RunSummary, StepDetail, TspInput, TspStep};

/// Brute-force tour search: city 0 is the fixed start, every permutation of
/// the remaining cities is evaluated exactly once, in lexicographic order.
pub(crate) struct TspEngine {
    cities: Vec<City>,
    best_route: Vec<usize>,
    best_distance: f64,
    cx: StepCtx,
}

impl TspEngine {
    pub fn new(input: TspInput, cx: StepCtx) -> Self {
        Self {
            cities: input.cities,
            best_route: Vec::new(),
            best_distance: f64::INFINITY,
            cx,
        }
    }

    fn emit(&self, step: TspStep) {
        self.cx.emit(StepDetail::Tsp(step));
    }

    /// Closed-tour length: consecutive legs plus the edge back to the start.
    fn tour_length(&self, route: &[usize]) -> f64 {
        (0..route.len())
            .map(|i| {
                let from = self.cities[route[i]];
                let to = self.cities[route[(i + 1) % route.len()]];
                ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt()
            })
            .sum()
    }

    pub async fn run(mut self) -> Outcome {
        let mut perm: Vec<usize> = (1..self.cities.len()).collect();
        loop {
            if !self.cx.active() {
                return Outcome::Cancelled;
            }

            let mut route = Vec::with_capacity(self.cities.len());
            route.push(0);
            route.extend_from_slice(&perm);

            self.cx.stats.permutations += 1;
            let distance = self.tour_length(&route);
            self.emit(TspStep::RouteEvaluated {
                route: route.clone(),
                distance,
            });
            self.cx.pause(Pace::Full).await;

            if distance < self.best_distance {
                self.best_distance = distance;
                self.best_route = route.clone();
                self.emit(TspStep::NewBest { route, distance });
                self.cx.pause(Pace::Full).await;
            }

            if !next_permutation(&mut perm) {
                break;
            }
        }

        let permutations = self.cx.stats.permutations;
        self.cx.finish(RunSummary::Tsp {
            best_route: self.best_route,
            best_distance: self.best_distance,
            permutations,
        })
    }
}

/// Advance `items` to its lexicographic successor in place. Returns false
/// once the sequence has wrapped past the last permutation.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    // Longest non-increasing suffix; its predecessor is the pivot.
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let pivot = i - 1;
    // Rightmost element greater than the pivot.
    let mut j = items.len() - 1;
    while items[j] <= items[pivot] {
        j -= 1;
    }
    items.swap(pivot, j);
    items[i..].reverse();
    true
}
