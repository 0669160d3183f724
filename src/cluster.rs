//! QuickBundles-style cluster builder.
//!
//! Pure CPU, deterministic k-means-like iteration over spatially
//! downsampled trajectories (§4.2). Has no device dependency: clustering
//! happens entirely on the host before any buffer is uploaded.

use alloc::vec;
use alloc::vec::Vec;

use crate::resample::downsample;
use crate::tensor::TrackTensor;

/// A total partition of `[0, T)` into `K` clusters, plus the forward index
/// used to materialize the bundler's flat `cluster_start`/`cluster_members`
/// layout.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// `inv_cluster[t]` — the cluster id containing trajectory `t`.
    assignment: Vec<u32>,
    /// `cluster_start[c]`: offset of cluster `c`'s members in `members`.
    cluster_start: Vec<u32>,
    /// `cluster_len[c]`: number of members in cluster `c`.
    cluster_len: Vec<u32>,
    /// Trajectory indices grouped by cluster.
    members: Vec<u32>,
    num_clusters: usize,
}

impl ClusterAssignment {
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn inv_cluster(&self) -> &[u32] {
        &self.assignment
    }

    pub fn cluster_start(&self) -> &[u32] {
        &self.cluster_start
    }

    pub fn cluster_len(&self) -> &[u32] {
        &self.cluster_len
    }

    pub fn members(&self) -> &[u32] {
        &self.members
    }

    pub fn cluster_of(&self, t: usize) -> u32 {
        self.assignment[t]
    }

    pub fn members_of(&self, c: usize) -> &[u32] {
        let start = self.cluster_start[c] as usize;
        let len = self.cluster_len[c] as usize;
        &self.members[start..start + len]
    }

    fn from_assignment(assignment: Vec<u32>, num_clusters: usize) -> Self {
        let mut cluster_len = vec![0u32; num_clusters];
        for &c in &assignment {
            cluster_len[c as usize] += 1;
        }
        let mut cluster_start = vec![0u32; num_clusters];
        let mut acc = 0u32;
        for c in 0..num_clusters {
            cluster_start[c] = acc;
            acc += cluster_len[c];
        }
        let mut cursor = cluster_start.clone();
        let mut members = vec![0u32; assignment.len()];
        for (t, &c) in assignment.iter().enumerate() {
            let slot = &mut cursor[c as usize];
            members[*slot as usize] = t as u32;
            *slot += 1;
        }
        Self {
            assignment,
            cluster_start,
            cluster_len,
            members,
            num_clusters,
        }
    }
}

fn squared_distance(a: &[[f64; 3]], b: &[[f64; 3]]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| {
            let dx = p[0] - q[0];
            let dy = p[1] - q[1];
            let dz = p[2] - q[2];
            dx * dx + dy * dy + dz * dz
        })
        .sum()
}

/// Builds `K` clusters over the trajectories in `tracks` using QuickBundles
/// (§4.2): downsample to `short_len`, evenly-spaced center init, `iterations`
/// rounds of assignment/update. Empty clusters retain their previous center.
pub fn build_clusters(
    tracks: &TrackTensor,
    num_clusters: usize,
    short_len: usize,
    iterations: usize,
) -> ClusterAssignment {
    let span = tracing::info_span!("cluster_build", num_clusters, iterations);
    let _guard = span.enter();

    let t = tracks.num_tracks();
    assert!(num_clusters >= 1, "cluster count must be at least 1");
    assert!(t >= 1, "cannot cluster zero trajectories");

    let q = downsample(tracks, short_len);
    let track_points = |idx: usize| -> Vec<[f64; 3]> { (0..short_len).map(|j| q.point(idx, j)).collect() };

    let step = t / num_clusters;
    let mut centers: Vec<Vec<[f64; 3]>> = (0..num_clusters)
        .map(|c| track_points((c * step).min(t - 1)))
        .collect();

    let mut assignment = vec![0u32; t];

    for iter in 0..iterations {
        for ti in 0..t {
            let p = track_points(ti);
            let mut best_c = 0usize;
            let mut best_d = f64::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let d = squared_distance(&p, center);
                if d < best_d {
                    best_d = d;
                    best_c = c;
                }
            }
            assignment[ti] = best_c as u32;
        }

        let mut sums = vec![vec![[0.0f64; 3]; short_len]; num_clusters];
        let mut counts = vec![0u32; num_clusters];
        for ti in 0..t {
            let c = assignment[ti] as usize;
            let p = track_points(ti);
            for j in 0..short_len {
                sums[c][j][0] += p[j][0];
                sums[c][j][1] += p[j][1];
                sums[c][j][2] += p[j][2];
            }
            counts[c] += 1;
        }
        for c in 0..num_clusters {
            if counts[c] == 0 {
                // Never reseed an empty cluster; keep its previous center.
                continue;
            }
            let n = counts[c] as f64;
            for j in 0..short_len {
                centers[c][j] = [sums[c][j][0] / n, sums[c][j][1] / n, sums[c][j][2] / n];
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(iter, sizes = ?counts, "cluster iteration complete");
        }
    }

    ClusterAssignment::from_assignment(assignment, num_clusters)
}
