use vessel_flow_concepts::IndexError;

use itertools::Itertools;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selects how candidate pairs and neighbors are found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionStrategy {
    /// Compare every agent with every other agent
    QuadraticScan,
    /// Bin agents into square cells and only compare agents in adjacent cells
    UniformGrid,
}

/// Spatial index over a snapshot of agent positions.
///
/// Agents are identified by their index in the slice given to [PairIndex::rebuild].
/// Indices are only valid until the next rebuild.
pub trait PairIndex {
    /// Replaces the indexed positions.
    fn rebuild(&mut self, positions: &[Vector2<f64>]) -> Result<(), IndexError>;

    /// Positions of the last rebuild
    fn positions(&self) -> &[Vector2<f64>];

    /// Every unordered pair which could possibly overlap, reported exactly once as `[i, j]`
    /// with `i < j`.
    fn candidate_pairs(&self) -> Vec<[usize; 2]>;

    /// Calls the visitor with every agent whose distance to `center` is strictly smaller
    /// than `radius`. An agent located at `center` is included.
    fn for_each_within(&self, center: &Vector2<f64>, radius: f64, visitor: &mut dyn FnMut(usize));

    /// Number of agents strictly within `radius` of `center`.
    fn count_within(&self, center: &Vector2<f64>, radius: f64) -> usize {
        let mut count = 0;
        self.for_each_within(center, radius, &mut |_| count += 1);
        count
    }

    /// Candidate pairs which actually overlap, given the radius of every agent.
    fn overlapping_pairs(&self, radii: &[f64]) -> Result<Vec<[usize; 2]>, IndexError> {
        let positions = self.positions();
        if radii.len() != positions.len() {
            return Err(IndexError(format!(
                "got {} radii for {} indexed agents",
                radii.len(),
                positions.len()
            )));
        }
        Ok(self
            .candidate_pairs()
            .into_iter()
            .filter(|&[i, j]| {
                let dist = (positions[i] - positions[j]).norm();
                dist > 0.0 && dist < radii[i] + radii[j]
            })
            .collect())
    }
}

fn check_positions(positions: &[Vector2<f64>]) -> Result<(), IndexError> {
    match positions
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        Some(n) => Err(IndexError(format!(
            "position {:?} of agent {n} is not finite",
            positions[n]
        ))),
        None => Ok(()),
    }
}

/// Brute force index which checks all $N(N-1)/2$ pairs.
#[derive(Clone, Debug, Default)]
pub struct QuadraticScan {
    positions: Vec<Vector2<f64>>,
}

impl PairIndex for QuadraticScan {
    fn rebuild(&mut self, positions: &[Vector2<f64>]) -> Result<(), IndexError> {
        check_positions(positions)?;
        self.positions = positions.to_vec();
        Ok(())
    }

    fn positions(&self) -> &[Vector2<f64>] {
        &self.positions
    }

    fn candidate_pairs(&self) -> Vec<[usize; 2]> {
        (0..self.positions.len())
            .tuple_combinations()
            .map(|(i, j)| [i, j])
            .collect()
    }

    fn for_each_within(&self, center: &Vector2<f64>, radius: f64, visitor: &mut dyn FnMut(usize)) {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| (*p - center).norm() < radius)
            .for_each(|(n, _)| visitor(n));
    }
}

/// Offsets of neighboring buckets which are visited from every bucket.
///
/// Together with pairs inside of the bucket itself, this half of the 3x3 stencil visits every
/// pair of adjacent buckets exactly once.
const FORWARD_NEIGHBORS: [[i64; 2]; 4] = [[1, -1], [1, 0], [1, 1], [0, 1]];

/// Bins agents into square buckets of edge length `cell_size`.
///
/// As long as no overlap distance exceeds the cell size, every overlapping pair resides in
/// the same or in adjacent buckets.
/// Buckets are stored in a [BTreeMap] such that the order of reported pairs only depends
/// on the positions.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    cell_size: f64,
    buckets: BTreeMap<[i64; 2], Vec<usize>>,
    positions: Vec<Vector2<f64>>,
}

impl UniformGrid {
    /// Constructs an empty grid.
    pub fn new(cell_size: f64) -> Result<Self, IndexError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(IndexError(format!(
                "cell size of grid must be positive and finite but is {cell_size}"
            )));
        }
        Ok(Self {
            cell_size,
            buckets: BTreeMap::new(),
            positions: Vec::new(),
        })
    }

    /// Edge length of one bucket
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn bucket_of(&self, pos: &Vector2<f64>) -> [i64; 2] {
        [
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
        ]
    }
}

impl PairIndex for UniformGrid {
    fn rebuild(&mut self, positions: &[Vector2<f64>]) -> Result<(), IndexError> {
        check_positions(positions)?;
        self.buckets.clear();
        self.positions = positions.to_vec();
        for (n, pos) in positions.iter().enumerate() {
            let key = self.bucket_of(pos);
            self.buckets.entry(key).or_default().push(n);
        }
        Ok(())
    }

    fn positions(&self) -> &[Vector2<f64>] {
        &self.positions
    }

    fn candidate_pairs(&self) -> Vec<[usize; 2]> {
        let mut pairs = Vec::new();
        for (key, members) in self.buckets.iter() {
            for (&i, &j) in members.iter().tuple_combinations() {
                pairs.push([i.min(j), i.max(j)]);
            }
            for [dx, dy] in FORWARD_NEIGHBORS {
                let Some(others) = self.buckets.get(&[key[0] + dx, key[1] + dy]) else {
                    continue;
                };
                for (&i, &j) in members.iter().cartesian_product(others.iter()) {
                    pairs.push([i.min(j), i.max(j)]);
                }
            }
        }
        pairs
    }

    fn for_each_within(&self, center: &Vector2<f64>, radius: f64, visitor: &mut dyn FnMut(usize)) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let [x_lo, y_lo] = self.bucket_of(&(center - Vector2::from([radius, radius])));
        let [x_hi, y_hi] = self.bucket_of(&(center + Vector2::from([radius, radius])));
        let span = x_hi
            .saturating_sub(x_lo)
            .saturating_add(1)
            .saturating_mul(y_hi.saturating_sub(y_lo).saturating_add(1));
        let mut visit_bucket = |members: &Vec<usize>| {
            for &n in members {
                if (self.positions[n] - center).norm() < radius {
                    visitor(n);
                }
            }
        };
        // Large queries are cheaper when iterating over occupied buckets only
        if span > self.buckets.len() as i64 {
            self.buckets
                .iter()
                .filter(|(key, _)| {
                    (x_lo..=x_hi).contains(&key[0]) && (y_lo..=y_hi).contains(&key[1])
                })
                .for_each(|(_, members)| visit_bucket(members));
        } else {
            for (x, y) in (x_lo..=x_hi).cartesian_product(y_lo..=y_hi) {
                if let Some(members) = self.buckets.get(&[x, y]) {
                    visit_bucket(members);
                }
            }
        }
    }
}

/// Dispatches to one of the two index implementations.
#[derive(Clone, Debug)]
pub enum CollisionIndex {
    /// See [QuadraticScan]
    QuadraticScan(QuadraticScan),
    /// See [UniformGrid]
    UniformGrid(UniformGrid),
}

impl CollisionIndex {
    /// Constructs an empty index of the given strategy.
    pub fn new(strategy: CollisionStrategy, cell_size: f64) -> Result<Self, IndexError> {
        Ok(match strategy {
            CollisionStrategy::QuadraticScan => Self::QuadraticScan(QuadraticScan::default()),
            CollisionStrategy::UniformGrid => Self::UniformGrid(UniformGrid::new(cell_size)?),
        })
    }

    /// The strategy implemented by this index.
    pub fn strategy(&self) -> CollisionStrategy {
        match self {
            Self::QuadraticScan(_) => CollisionStrategy::QuadraticScan,
            Self::UniformGrid(_) => CollisionStrategy::UniformGrid,
        }
    }
}

impl PairIndex for CollisionIndex {
    fn rebuild(&mut self, positions: &[Vector2<f64>]) -> Result<(), IndexError> {
        match self {
            Self::QuadraticScan(index) => index.rebuild(positions),
            Self::UniformGrid(index) => index.rebuild(positions),
        }
    }

    fn positions(&self) -> &[Vector2<f64>] {
        match self {
            Self::QuadraticScan(index) => index.positions(),
            Self::UniformGrid(index) => index.positions(),
        }
    }

    fn candidate_pairs(&self) -> Vec<[usize; 2]> {
        match self {
            Self::QuadraticScan(index) => index.candidate_pairs(),
            Self::UniformGrid(index) => index.candidate_pairs(),
        }
    }

    fn for_each_within(&self, center: &Vector2<f64>, radius: f64, visitor: &mut dyn FnMut(usize)) {
        match self {
            Self::QuadraticScan(index) => index.for_each_within(center, radius, visitor),
            Self::UniformGrid(index) => index.for_each_within(center, radius, visitor),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn random_positions(n: usize, seed: u64) -> Vec<Vector2<f64>> {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vector2::from([rng.gen_range(0.0..300.0), rng.gen_range(-100.0..100.0)]))
            .collect()
    }

    #[test]
    fn reject_bad_cell_size() {
        assert!(UniformGrid::new(0.0).is_err());
        assert!(UniformGrid::new(f64::INFINITY).is_err());
        assert!(UniformGrid::new(-3.0).is_err());
    }

    #[test]
    fn reject_non_finite_positions() -> Result<(), IndexError> {
        let mut grid = UniformGrid::new(18.0)?;
        assert!(grid.rebuild(&[Vector2::from([f64::NAN, 0.0])]).is_err());
        let mut scan = QuadraticScan::default();
        assert!(scan.rebuild(&[Vector2::from([0.0, f64::INFINITY])]).is_err());
        Ok(())
    }

    #[test]
    fn grid_reports_every_pair_once() -> Result<(), IndexError> {
        let positions = random_positions(400, 1);
        let mut grid = UniformGrid::new(20.0)?;
        grid.rebuild(&positions)?;
        let pairs = grid.candidate_pairs();
        let unique: BTreeSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());
        assert!(pairs.iter().all(|[i, j]| i < j));
        Ok(())
    }

    #[test]
    fn grid_and_scan_find_same_overlaps() -> Result<(), IndexError> {
        for seed in 0..5 {
            let positions = random_positions(300, seed);
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed + 100);
            let radii: Vec<f64> = (0..positions.len())
                .map(|_| rng.gen_range(3.2..9.5))
                .collect();
            let mut grid = CollisionIndex::new(CollisionStrategy::UniformGrid, 19.0)?;
            let mut scan = CollisionIndex::new(CollisionStrategy::QuadraticScan, 19.0)?;
            grid.rebuild(&positions)?;
            scan.rebuild(&positions)?;
            let from_grid: BTreeSet<_> = grid.overlapping_pairs(&radii)?.into_iter().collect();
            let from_scan: BTreeSet<_> = scan.overlapping_pairs(&radii)?.into_iter().collect();
            assert!(!from_scan.is_empty());
            assert_eq!(from_grid, from_scan);
        }
        Ok(())
    }

    #[test]
    fn neighbor_counts_agree() -> Result<(), IndexError> {
        let positions = random_positions(250, 7);
        let mut grid = CollisionIndex::new(CollisionStrategy::UniformGrid, 18.0)?;
        let mut scan = CollisionIndex::new(CollisionStrategy::QuadraticScan, 18.0)?;
        grid.rebuild(&positions)?;
        scan.rebuild(&positions)?;
        for pos in positions.iter() {
            for radius in [5.0, 30.0, 35.0, 70.0, 1e4, f64::INFINITY] {
                assert_eq!(grid.count_within(pos, radius), scan.count_within(pos, radius));
            }
        }
        Ok(())
    }

    #[test]
    fn self_is_counted_as_neighbor() -> Result<(), IndexError> {
        let mut grid = UniformGrid::new(18.0)?;
        grid.rebuild(&[Vector2::from([5.0, 5.0]), Vector2::from([100.0, 5.0])])?;
        assert_eq!(grid.count_within(&Vector2::from([5.0, 5.0]), 35.0), 1);
        assert_eq!(grid.count_within(&Vector2::from([5.0, 5.0]), 0.0), 0);
        Ok(())
    }

    #[test]
    fn pairs_across_bucket_borders() -> Result<(), IndexError> {
        let positions = [
            Vector2::from([17.9, 17.9]),
            Vector2::from([18.1, 18.1]),
            Vector2::from([-0.1, 18.1]),
            Vector2::from([36.1, 0.0]),
        ];
        let mut grid = UniformGrid::new(18.0)?;
        grid.rebuild(&positions)?;
        let pairs: BTreeSet<_> = grid.candidate_pairs().into_iter().collect();
        assert!(pairs.contains(&[0, 1]));
        assert!(pairs.contains(&[0, 2]));
        // Bucket (2, 0) is not adjacent to bucket (-1, 1)
        assert!(!pairs.contains(&[2, 3]));
        Ok(())
    }
}
