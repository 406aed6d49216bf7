//! Path search over the pool graph.
//!
//! Coins are nodes and pools are edges. Only compliance-flagged pools are traversed and a
//! pool is used at most once per path.

use crate::config::RoutingConfig;
use crate::error::ValidationError;
use runesx_domain::entities::pool::Pool;
use runesx_domain::value_objects::Hop;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Ordered hops from the input coin to the output coin.
pub type Route = Vec<Hop>;

/// Search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Every path within the hop bound.
    #[default]
    Dfs,
    /// Shortest paths first, capped in count.
    Bfs,
}

impl FromStr for Algorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" => Ok(Self::Dfs),
            "bfs" => Ok(Self::Bfs),
            other => Err(ValidationError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dfs => f.write_str("dfs"),
            Self::Bfs => f.write_str("bfs"),
        }
    }
}

/// Finds candidate routes with the selected algorithm.
pub fn find_paths(
    config: &RoutingConfig,
    start: &str,
    end: &str,
    pools: &[Pool],
    max_hops: u32,
    algorithm: Algorithm,
) -> Vec<Route> {
    let paths = match algorithm {
        Algorithm::Dfs => find_paths_dfs(start, end, pools, max_hops),
        Algorithm::Bfs => find_paths_bfs(
            start,
            end,
            pools,
            max_hops,
            config.bfs_max_paths,
        ),
    };
    debug!(
        start = %start,
        end = %end,
        algorithm = %algorithm,
        max_hops,
        found = paths.len(),
        "Path search complete"
    );
    paths
}

struct DfsFrame {
    coin: String,
    path: Route,
    visited: HashSet<String>,
}

/// Exhaustive depth-first search.
///
/// Paths come out in the order a recursive walk over `pools` would find them.
pub fn find_paths_dfs(start: &str, end: &str, pools: &[Pool], max_hops: u32) -> Vec<Route> {
    let max_hops = max_hops as usize;
    let mut paths = Vec::new();
    let mut stack = vec![DfsFrame {
        coin: start.to_string(),
        path: Vec::new(),
        visited: HashSet::new(),
    }];

    while let Some(frame) = stack.pop() {
        if frame.path.len() > max_hops {
            continue;
        }
        if frame.coin == end {
            paths.push(frame.path);
            continue;
        }

        let children: Vec<DfsFrame> = pools
            .iter()
            .filter(|p| p.compliant && !frame.visited.contains(&p.id))
            .filter_map(|pool| {
                let next = pool.counterpart(&frame.coin)?;
                let mut path = frame.path.clone();
                path.push(Hop::new(frame.coin.as_str(), next.ticker.as_str(), pool.id.as_str()));
                let mut visited = frame.visited.clone();
                visited.insert(pool.id.clone());
                Some(DfsFrame {
                    coin: next.ticker.clone(),
                    path,
                    visited,
                })
            })
            .collect();

        // reversed so the first pool is explored first
        stack.extend(children.into_iter().rev());
    }

    paths
}

/// Breadth-first search, returning at most `max_paths` routes.
///
/// Pools with an empty reserve are never traversed. Each `(coin, pool)` edge is queued at most
/// once over the whole search, so the frontier never outgrows twice the pool count.
pub fn find_paths_bfs(
    start: &str,
    end: &str,
    pools: &[Pool],
    max_hops: u32,
    max_paths: usize,
) -> Vec<Route> {
    let max_hops = max_hops as usize;

    let mut adjacency: HashMap<&str, Vec<(&Pool, &str)>> = HashMap::new();
    for pool in pools
        .iter()
        .filter(|p| p.compliant && !p.has_empty_reserve())
    {
        let (a, b) = (pool.coin_a.ticker.as_str(), pool.coin_b.ticker.as_str());
        adjacency.entry(a).or_default().push((pool, b));
        adjacency.entry(b).or_default().push((pool, a));
    }

    let mut paths = Vec::new();
    let mut queue: VecDeque<(&str, Route)> = VecDeque::from([(start, Vec::new())]);
    let mut visited: HashSet<(&str, &str)> = HashSet::new();

    while paths.len() < max_paths {
        let Some((coin, path)) = queue.pop_front() else {
            break;
        };
        if coin == end {
            paths.push(path);
            continue;
        }
        if path.len() >= max_hops {
            continue;
        }

        for &(pool, next) in adjacency.get(coin).into_iter().flatten() {
            if path.iter().any(|hop| hop.pool_id == pool.id) {
                continue;
            }
            if !visited.insert((coin, pool.id.as_str())) {
                continue;
            }

            let mut extended = path.clone();
            extended.push(Hop::new(coin, next, pool.id.as_str()));
            queue.push_back((next, extended));
        }
    }

    paths
}
