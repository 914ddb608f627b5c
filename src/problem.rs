//! Problem definition and data structures for the TSP.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::objective::Distance;

/// Largest edge length accepted, so that the delta of a four-edge move
/// cannot overflow [`Distance`].
pub const MAX_DISTANCE: Distance = Distance::MAX / 8;

/// A city in the plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Node {
    /// Create a new node.
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }

    /// Euclidean distance rounded to the nearest integer (TSPLIB `EUC_2D`).
    pub fn distance(&self, other: &Node) -> Distance {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt().round() as Distance
    }
}

/// A symmetric TSP instance with a precomputed distance matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    /// Coordinates, empty for instances given as an explicit matrix.
    pub nodes: Vec<Node>,
    pub distance_matrix: Vec<Vec<Distance>>,
}

impl Problem {
    /// Create a Euclidean instance from city coordinates.
    pub fn new(name: String, nodes: Vec<Node>) -> Self {
        let distance_matrix = Self::compute_distance_matrix(&nodes);

        Problem {
            name,
            nodes,
            distance_matrix,
        }
    }

    /// Create an instance from an explicit square distance matrix.
    pub fn from_matrix(name: String, distance_matrix: Vec<Vec<Distance>>) -> Self {
        debug_assert!(distance_matrix
            .iter()
            .all(|row| row.len() == distance_matrix.len()));
        debug_assert!(distance_matrix
            .iter()
            .flatten()
            .all(|&d| (0..=MAX_DISTANCE).contains(&d)));

        Problem {
            name,
            nodes: Vec::new(),
            distance_matrix,
        }
    }

    /// Cities placed uniformly at random in a `side` x `side` square.
    pub fn random_euclidean(n: usize, side: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let nodes = (0..n)
            .map(|id| Node::new(id, rng.gen_range(0.0..side), rng.gen_range(0.0..side)))
            .collect();
        Problem::new(format!("random-{}-{}", n, seed), nodes)
    }

    /// Symmetric matrix with entries drawn uniformly from `0..=max_distance`.
    pub fn random_matrix(n: usize, max_distance: Distance, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut matrix = vec![vec![0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = rng.gen_range(0..=max_distance);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        Problem::from_matrix(format!("matrix-{}-{}", n, seed), matrix)
    }

    /// Distance between two cities.
    #[inline]
    pub fn get_distance(&self, from: usize, to: usize) -> Distance {
        self.distance_matrix[from][to]
    }

    /// Number of cities.
    pub fn dimension(&self) -> usize {
        self.distance_matrix.len()
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.dimension();
        (0..n).all(|i| (i + 1..n).all(|j| self.distance_matrix[i][j] == self.distance_matrix[j][i]))
    }

    /// Generate the full distance matrix for all nodes.
    fn compute_distance_matrix(nodes: &[Node]) -> Vec<Vec<Distance>> {
        let n = nodes.len();
        let mut matrix = vec![vec![0; n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let d = nodes[i].distance(&nodes[j]);
                debug_assert!(d <= MAX_DISTANCE);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Load a TSPLIB instance with a `NODE_COORD_SECTION` (`EUC_2D`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Parse a TSPLIB instance from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut name = String::from("unnamed");
        let mut nodes = Vec::new();
        let mut in_coords = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if in_coords {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(invalid_data(format!("malformed coordinate line '{}'", line)));
                }
                let x = parse_number(parts[1])?;
                let y = parse_number(parts[2])?;
                nodes.push(Node::new(nodes.len(), x, y));
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "EDGE_WEIGHT_TYPE" if value != "EUC_2D" => {
                        return Err(invalid_data(format!(
                            "unsupported edge weight type '{}'",
                            value
                        )));
                    }
                    _ => {}
                }
            }
        }

        if nodes.is_empty() {
            return Err(invalid_data("no NODE_COORD_SECTION entries".to_string()));
        }

        Ok(Problem::new(name, nodes))
    }
}

fn parse_number(field: &str) -> io::Result<f64> {
    field
        .parse::<f64>()
        .map_err(|err| invalid_data(format!("bad coordinate '{}': {}", field, err)))
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
